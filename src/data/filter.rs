use std::collections::BTreeMap;

use chrono::Utc;
use tracing::info;

use crate::data::records::parse_db_datetime;
use crate::data::Target;

/// The legal terms under which a Target may be crawled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terms {
    /// Non-print legal deposit eligibility
    Npld,
    /// Open-access (licensed) Targets
    Oa,
    /// By-permission: licensed but not legal-deposit eligible
    Bypm,
    /// No filtering on terms
    All,
}

impl Terms {
    pub fn parse(value: &str) -> Option<Terms> {
        match value {
            "npld" => Some(Terms::Npld),
            "oa" => Some(Terms::Oa),
            "bypm" => Some(Terms::Bypm),
            "all" => Some(Terms::All),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Terms::Npld => "npld",
            Terms::Oa => "oa",
            Terms::Bypm => "bypm",
            Terms::All => "all",
        }
    }
}

/// Selects the subset of Targets an export run should emit
///
/// The defaults match the common pipeline case: legal-deposit Targets of
/// any frequency, hidden and expired records included.
#[derive(Debug, Clone)]
pub struct TargetFilter {
    /// Crawl frequency to match (case-insensitive); `all` means
    /// everything except `nevercrawl`; `None` disables the filter
    pub frequency: Option<String>,
    pub terms: Terms,
    pub include_hidden: bool,
    pub omit_uk_tlds: bool,
    pub include_expired: bool,
}

impl Default for TargetFilter {
    fn default() -> TargetFilter {
        TargetFilter {
            frequency: None,
            terms: Terms::Npld,
            include_hidden: true,
            omit_uk_tlds: false,
            include_expired: true,
        }
    }
}

impl TargetFilter {
    /// Whether one Target passes every configured filter
    pub fn matches(&self, target: &Target) -> bool {
        if !self.include_hidden && target.hidden {
            return false;
        }

        if let Some(frequency) = &self.frequency {
            let target_frequency = target.crawl_frequency.to_lowercase();
            if frequency == "all" {
                if target_frequency == "nevercrawl" {
                    return false;
                }
            } else if target_frequency != frequency.to_lowercase() {
                return false;
            }
        }

        match self.terms {
            Terms::Npld if !target.is_npld => return false,
            Terms::Oa if !target.is_oa => return false,
            Terms::Bypm if !target.is_oa || target.is_npld => return false,
            _ => {}
        }

        // Items with a UK TLD are trivially in crawl scope already:
        if self.omit_uk_tlds && target.is_top_level_domain {
            return false;
        }

        if !self.include_expired {
            if let Some(end_date) = target
                .crawl_end_date
                .as_deref()
                .and_then(parse_db_datetime)
            {
                if end_date < Utc::now().naive_utc() {
                    info!(
                        "Skipping target {} '{}' with crawl end date in the past",
                        target.id, target.title
                    );
                    return false;
                }
            }
        }

        true
    }

    /// Applies the filter over the whole Target set, in id order
    pub fn apply<'a>(&self, targets: &'a BTreeMap<i64, Target>) -> Vec<&'a Target> {
        targets
            .values()
            .filter(|target| self.matches(target))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(id: i64) -> Target {
        Target {
            id,
            crawl_frequency: "DAILY".to_string(),
            is_npld: true,
            ..Target::default()
        }
    }

    #[test]
    fn test_terms_parse() {
        assert_eq!(Terms::parse("npld"), Some(Terms::Npld));
        assert_eq!(Terms::parse("oa"), Some(Terms::Oa));
        assert_eq!(Terms::parse("bypm"), Some(Terms::Bypm));
        assert_eq!(Terms::parse("all"), Some(Terms::All));
        assert_eq!(Terms::parse("no-terms"), None);
    }

    #[test]
    fn test_default_filter_keeps_npld() {
        let filter = TargetFilter::default();
        assert!(filter.matches(&target(1)));

        let mut not_npld = target(2);
        not_npld.is_npld = false;
        assert!(!filter.matches(&not_npld));
    }

    #[test]
    fn test_hidden_excluded_unless_included() {
        let mut hidden = target(1);
        hidden.hidden = true;

        let mut filter = TargetFilter::default();
        filter.include_hidden = false;
        assert!(!filter.matches(&hidden));

        filter.include_hidden = true;
        assert!(filter.matches(&hidden));
    }

    #[test]
    fn test_frequency_all_drops_only_nevercrawl() {
        let filter = TargetFilter {
            frequency: Some("all".to_string()),
            ..TargetFilter::default()
        };
        assert!(filter.matches(&target(1)));

        let mut blocked = target(2);
        blocked.crawl_frequency = "NEVERCRAWL".to_string();
        assert!(!filter.matches(&blocked));
    }

    #[test]
    fn test_frequency_match_is_case_insensitive() {
        let filter = TargetFilter {
            frequency: Some("daily".to_string()),
            ..TargetFilter::default()
        };
        assert!(filter.matches(&target(1)));

        let mut weekly = target(2);
        weekly.crawl_frequency = "WEEKLY".to_string();
        assert!(!filter.matches(&weekly));
    }

    #[test]
    fn test_bypm_is_oa_and_not_npld() {
        let filter = TargetFilter {
            terms: Terms::Bypm,
            ..TargetFilter::default()
        };

        let mut bypm = target(1);
        bypm.is_npld = false;
        bypm.is_oa = true;
        assert!(filter.matches(&bypm));

        let mut both = target(2);
        both.is_oa = true;
        assert!(!filter.matches(&both), "NPLD targets are not by-permission");

        let mut neither = target(3);
        neither.is_npld = false;
        assert!(!filter.matches(&neither));
    }

    #[test]
    fn test_uk_tld_omission() {
        let mut uk = target(1);
        uk.is_top_level_domain = true;

        let mut filter = TargetFilter::default();
        assert!(filter.matches(&uk));
        filter.omit_uk_tlds = true;
        assert!(!filter.matches(&uk));
    }

    #[test]
    fn test_expired_targets_dropped_when_excluded() {
        let mut expired = target(1);
        expired.crawl_end_date = Some("2001-01-01 00:00:00".to_string());

        let mut filter = TargetFilter::default();
        assert!(filter.matches(&expired));

        filter.include_expired = false;
        assert!(!filter.matches(&expired));

        let mut future = target(2);
        future.crawl_end_date = Some("2999-01-01 00:00:00".to_string());
        assert!(filter.matches(&future));
    }

    #[test]
    fn test_unparseable_end_date_is_not_expiry() {
        let mut odd = target(1);
        odd.crawl_end_date = Some("sometime".to_string());
        let filter = TargetFilter {
            include_expired: false,
            ..TargetFilter::default()
        };
        assert!(filter.matches(&odd));
    }
}
