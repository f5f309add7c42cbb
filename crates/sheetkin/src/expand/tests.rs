//! Tests for the document transform.

use super::*;
use rstest::rstest;

const INJECT: ExpandOptions = ExpandOptions {
    inject_background: true,
};

#[rstest]
#[case("Feature: F\n\n  Scenario: a\n    Given x\n\n\n  # trailing comment\n")]
#[case("@tag\nFeature: F\n  Background:\n    Given setup\n  Scenario: a\n    Then ok")]
#[case("Feature: F\n  Scenario: a\n    Given doc\n      \"\"\"\n      Scenario Outline: not real <x>\n      \"\"\"\n")]
#[case("")]
fn outline_free_documents_are_unchanged(#[case] source: &str) {
    let expected = format!("{}\n", source.trim_end_matches('\n'));
    assert_eq!(expand_document(source, ExpandOptions::default()), expected);
}

#[test]
fn expansion_is_idempotent() {
    let source = concat!(
        "Feature: F\n",
        "  @outline\n",
        "  Scenario Outline: o <n>\n",
        "    Given <n>\n",
        "    @block\n",
        "    Examples:\n",
        "      | n |\n",
        "      | 1 |\n",
        "      | 2 |\n",
        "  Scenario: plain\n",
        "    Given y\n",
    );
    let once = expand_document(source, ExpandOptions::default());
    let twice = expand_document(&once, ExpandOptions::default());
    assert_eq!(once, twice);
    assert!(!once.contains("Outline"));
}

#[test]
fn tagged_examples_stay_inside_outline() {
    let source = concat!(
        "Feature: F\n",
        "  Scenario Outline: o <n>\n",
        "    Given <n>\n",
        "\n",
        "    @first\n",
        "    Examples:\n",
        "      | n |\n",
        "      | 1 |\n",
        "\n",
        "  @next\n",
        "  Scenario: after\n",
        "    Then done\n",
    );
    let expected = concat!(
        "Feature: F\n",
        "    @first\n",
        "  Scenario: o 1\n",
        "    Given 1\n",
        "\n",
        "  @next\n",
        "  Scenario: after\n",
        "    Then done\n",
    );
    assert_eq!(expand_document(source, ExpandOptions::default()), expected);
}

#[test]
fn injects_feature_and_rule_background() {
    let source = concat!(
        "Feature: F\n",
        "  Background:\n",
        "\n",
        "    Given feature setup\n",
        "\n",
        "  Scenario: top\n",
        "    Then a\n",
        "  Rule: R\n",
        "    Background:\n",
        "      Given rule setup <n>\n",
        "    Scenario Outline: in rule\n",
        "      Then <n>\n",
        "      Examples:\n",
        "        | n |\n",
        "        | 1 |\n",
        "  Rule: S\n",
        "    Scenario: other rule\n",
        "      Then b\n",
    );
    let expected = concat!(
        "Feature: F\n",
        "  Scenario: top\n",
        "    Given feature setup\n",
        "    Then a\n",
        "\n",
        "  Rule: R\n",
        "    Scenario: in rule\n",
        "    Given feature setup\n",
        "      Given rule setup 1\n",
        "      Then 1\n",
        "\n",
        "  Rule: S\n",
        "    Scenario: other rule\n",
        "    Given feature setup\n",
        "      Then b\n",
    );
    assert_eq!(expand_document(source, INJECT), expected);
}

#[test]
fn tags_after_background_flush_before_scenario() {
    let source = concat!(
        "Feature: F\n",
        "  Background:\n",
        "    Given setup\n",
        "  @smoke\n",
        "  Scenario: s\n",
        "    Then ok\n",
    );
    let expected = concat!(
        "Feature: F\n",
        "  @smoke\n",
        "  Scenario: s\n",
        "    Given setup\n",
        "    Then ok\n",
    );
    assert_eq!(expand_document(source, INJECT), expected);
}

#[test]
fn crlf_is_normalised() {
    let source = "Scenario Outline: o\r\n  Given <a>\r\n  Examples:\r\n    | a |\r\n    | 1 |\r\n";
    assert_eq!(
        expand_document(source, ExpandOptions::default()),
        "Scenario: o\n  Given 1\n"
    );
}

#[test]
fn degenerate_outline_keeps_its_tags() {
    let source = "@t\nScenario Outline: o\n  Given <a>\n  Examples:\n    | a |\n";
    assert_eq!(
        expand_document(source, ExpandOptions::default()),
        source.to_string()
    );
}

#[test]
fn trailing_tags_are_not_lost() {
    let source = "Feature: F\n@dangling\n";
    assert_eq!(expand_document(source, ExpandOptions::default()), source);
}

#[test]
fn hash_inside_examples_cell_does_not_drop_rows() {
    let source = concat!(
        "Feature: Palette\n",
        "  Scenario Outline: colour <c>\n",
        "    Given the colour <c>\n",
        "    Examples:\n",
        "      | c      |\n",
        "      | red    |\n",
        "      | #fff   |\n",
        "      | PR #42 |\n",
        "      | blue   |\n",
        "  Scenario: after\n",
        "    Then done\n",
    );
    let out = expand_document(source, ExpandOptions::default());
    assert_eq!(out.matches("Scenario:").count(), 5);
    assert!(out.contains("  Scenario: colour #fff\n    Given the colour #fff\n"));
    assert!(out.contains("  Scenario: colour PR #42\n"));
    assert!(out.contains("  Scenario: colour blue\n"));
    assert!(out.contains("  Scenario: after\n"));
}
