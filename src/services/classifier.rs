// src/services/classifier.rs

//! First-match-wins rule classification.

use crate::models::{MatchMode, Rule, RuleSet};

/// Tests paste text against an ordered rule set.
///
/// Rules are evaluated in declaration order and evaluation stops at the first
/// match; later rules are never consulted for that paste.
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: RuleSet,
    mode: MatchMode,
}

impl Classifier {
    pub fn new(rules: RuleSet, mode: MatchMode) -> Self {
        Self { rules, mode }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Return the first rule matching `text`, if any.
    pub fn classify(&self, text: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| self.matches(rule, text))
    }

    fn matches(&self, rule: &Rule, text: &str) -> bool {
        match self.mode {
            // Leftmost-first search: a match starting at 0 is returned if one exists.
            MatchMode::Prefix => rule.regex().find(text).is_some_and(|m| m.start() == 0),
            MatchMode::Anywhere => rule.regex().is_match(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(content: &str) -> RuleSet {
        RuleSet::parse(content).unwrap()
    }

    #[test]
    fn test_prefix_match() {
        let classifier = Classifier::new(rules("SECRET,s.log,s\n"), MatchMode::Prefix);
        assert!(classifier.classify("secret data here").is_some());
        assert!(classifier.classify("no SECRET at start").is_none());
    }

    #[test]
    fn test_prefix_match_with_leading_wildcard() {
        let classifier = Classifier::new(rules(".*password,p.log,p\n"), MatchMode::Prefix);
        assert!(classifier.classify("my PASSWORD is").is_some());
    }

    #[test]
    fn test_later_match_in_text_still_counts_when_prefix_also_matches() {
        // `a|b` finds "b" at 0 even though "a" appears later.
        let classifier = Classifier::new(rules("a|b,x.log,x\n"), MatchMode::Prefix);
        assert!(classifier.classify("b then a").is_some());
        assert!(classifier.classify("c then a").is_none());
    }

    #[test]
    fn test_anywhere_match() {
        let classifier = Classifier::new(rules("SECRET,s.log,s\n"), MatchMode::Anywhere);
        assert!(classifier.classify("no SECRET at start").is_some());
    }

    #[test]
    fn test_first_rule_wins() {
        let classifier = Classifier::new(
            rules("^SECRET,first.log,first\nDATA,second.log,second\n^SECRET DATA,third.log,third\n"),
            MatchMode::Prefix,
        );
        let rule = classifier.classify("SECRET DATA HERE").unwrap();
        assert_eq!(rule.log_file.to_str(), Some("first.log"));
    }

    #[test]
    fn test_declaration_order_decides() {
        let classifier = Classifier::new(
            rules("^.*,catch_all.log,all\n^SECRET,secret.log,secret\n"),
            MatchMode::Prefix,
        );
        let rule = classifier.classify("SECRET").unwrap();
        assert_eq!(rule.log_file.to_str(), Some("catch_all.log"));
    }

    #[test]
    fn test_no_rules_no_match() {
        let classifier = Classifier::new(RuleSet::default(), MatchMode::Prefix);
        assert!(classifier.classify("anything").is_none());
    }
}
