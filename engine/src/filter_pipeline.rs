//! Visible-set derivation
//!
//! A pure function of the full record set and the criteria. Nothing is
//! cached between calls, so "select all" and ticking every option one by one
//! give the same result.

use shared::{EventId, FilterCriteria, MULTI_CATEGORY, OptionFilter, TimelineEvent};

/// Events passing every predicate, in ingestion order.
pub fn filter_events<'a>(
    events: &'a [TimelineEvent],
    criteria: &FilterCriteria,
) -> Vec<&'a TimelineEvent> {
    if criteria.active_categories.is_empty() && !criteria.key_events_enabled {
        log::debug!("no active categories and key events disabled, nothing visible");
        return Vec::new();
    }

    // Only a blank search is empty; otherwise spaces are part of the needle
    let needle = if criteria.search_text.trim().is_empty() {
        String::new()
    } else {
        criteria.search_text.to_lowercase()
    };
    let visible: Vec<&TimelineEvent> = events
        .iter()
        .filter(|event| passes(event, criteria, &needle))
        .collect();
    log::debug!("filter kept {} of {} events", visible.len(), events.len());
    visible
}

pub fn visible_ids(events: &[TimelineEvent], criteria: &FilterCriteria) -> Vec<EventId> {
    filter_events(events, criteria)
        .into_iter()
        .map(|event| event.id)
        .collect()
}

fn passes(event: &TimelineEvent, criteria: &FilterCriteria, needle: &str) -> bool {
    passes_category(event, criteria)
        && passes_option_filter(&criteria.topics, event.topics.iter().map(String::as_str))
        && passes_option_filter(
            &criteria.sources,
            Some(event.source.as_str())
                .filter(|source| !source.is_empty())
                .into_iter(),
        )
        && (!criteria.key_events_only || event.is_key_event)
        && matches_search(event, needle)
}

fn passes_category(event: &TimelineEvent, criteria: &FilterCriteria) -> bool {
    if event.is_key_event {
        // Key events are gated by their own toggle; with no category active
        // they still show on their own
        return criteria.key_events_enabled
            && (criteria.active_categories.is_empty() || category_matches(event, criteria));
    }
    category_matches(event, criteria)
}

fn category_matches(event: &TimelineEvent, criteria: &FilterCriteria) -> bool {
    match event.categories.as_slice() {
        [] => true,
        [single] => criteria.active_categories.contains(single),
        _ => criteria.active_categories.contains(MULTI_CATEGORY),
    }
}

fn passes_option_filter<'v>(filter: &OptionFilter, mut values: impl Iterator<Item = &'v str>) -> bool {
    if !filter.has_options() || filter.is_everything_selected() {
        return true;
    }
    values.any(|value| filter.is_selected(value))
}

fn matches_search(event: &TimelineEvent, needle: &str) -> bool {
    needle.is_empty()
        || event.title.to_lowercase().contains(needle)
        || event.notes.to_lowercase().contains(needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{EventRecord, FilterOptions, TimeMs, events_from_records};
    use std::collections::BTreeSet;

    fn record(
        title: &str,
        categories: &[&str],
        topics: &[&str],
        source: &str,
        is_key_event: bool,
    ) -> EventRecord {
        EventRecord {
            time: TimeMs::from_ymd(2020, 1, 1).unwrap(),
            title: title.to_string(),
            notes: format!("notes for {title}"),
            source: source.to_string(),
            source_url: None,
            categories: categories.iter().map(|c| c.to_string()).collect(),
            topics: topics.iter().map(|t| t.to_string()).collect(),
            is_key_event,
        }
    }

    fn dataset() -> Vec<TimelineEvent> {
        events_from_records(vec![
            record("Tariff announced", &["Policy"], &["Steel"], "Gazette", false),
            record("Summit", &["Policy", "Trade"], &["Steel", "Aluminium"], "Wire", true),
            record("Quota lifted", &["Trade"], &[], "Gazette", false),
            record("Landmark ruling", &["Courts"], &["Aluminium"], "", true),
            record("Uncategorized note", &[], &[], "Wire", false),
        ])
    }

    fn everything(events: &[TimelineEvent]) -> FilterCriteria {
        FilterCriteria::show_everything(&FilterOptions::from_events(events))
    }

    fn set(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn show_everything_keeps_every_event() {
        let events = dataset();
        assert_eq!(visible_ids(&events, &everything(&events)).len(), events.len());
    }

    #[test]
    fn ticking_every_topic_equals_select_all() {
        let events = dataset();
        let all = everything(&events);
        let mut individually = all.clone();
        individually.topics = OptionFilter::only(all.topics.options.clone(), ["steel", "aluminium"]);

        let expected = visible_ids(&events, &all);
        assert_eq!(visible_ids(&events, &individually), expected);
        // Zero-topic events survive both ways
        assert!(expected.contains(&EventId(2)));
        assert!(expected.contains(&EventId(4)));
    }

    #[test]
    fn ticking_every_source_equals_select_all() {
        let events = dataset();
        let all = everything(&events);
        let mut individually = all.clone();
        individually.sources = OptionFilter::only(all.sources.options.clone(), ["Gazette", "Wire"]);
        assert_eq!(visible_ids(&events, &individually), visible_ids(&events, &all));
    }

    #[test]
    fn partial_topic_selection_requires_a_selected_topic() {
        let events = dataset();
        let mut criteria = everything(&events);
        criteria.topics = OptionFilter::only(criteria.topics.options.clone(), ["aluminium"]);
        assert_eq!(visible_ids(&events, &criteria), vec![EventId(1), EventId(3)]);
    }

    #[test]
    fn empty_topic_universe_bypasses_the_topic_filter() {
        let events = dataset();
        let mut criteria = everything(&events);
        criteria.topics = OptionFilter::only(BTreeSet::new(), Vec::<String>::new());
        assert_eq!(visible_ids(&events, &criteria).len(), events.len());
    }

    #[test]
    fn multi_category_events_follow_the_multi_toggle() {
        let events = dataset();
        let mut criteria = everything(&events);
        criteria.active_categories.remove(MULTI_CATEGORY);
        assert!(!visible_ids(&events, &criteria).contains(&EventId(1)));

        criteria.active_categories = set(&["multi"]);
        criteria.key_events_enabled = true;
        let ids = visible_ids(&events, &criteria);
        assert!(ids.contains(&EventId(1)));
        assert!(!ids.contains(&EventId(0)));
    }

    #[test]
    fn zero_categories_with_key_events_disabled_is_empty() {
        let events = dataset();
        let mut criteria = everything(&events);
        criteria.active_categories.clear();
        criteria.key_events_enabled = false;
        assert!(filter_events(&events, &criteria).is_empty());
    }

    #[test]
    fn zero_categories_with_key_events_enabled_keeps_key_events() {
        let events = dataset();
        let mut criteria = everything(&events);
        criteria.active_categories.clear();
        let ids = visible_ids(&events, &criteria);
        assert!(ids.contains(&EventId(1)));
        assert!(ids.contains(&EventId(3)));
        assert!(!ids.contains(&EventId(0)));
    }

    #[test]
    fn disabling_key_events_hides_them() {
        let events = dataset();
        let mut criteria = everything(&events);
        criteria.key_events_enabled = false;
        let ids = visible_ids(&events, &criteria);
        assert!(!ids.contains(&EventId(1)));
        assert!(!ids.contains(&EventId(3)));
        assert!(ids.contains(&EventId(0)));
    }

    #[test]
    fn key_events_only_and_search_narrow_further() {
        let events = dataset();
        let mut criteria = everything(&events);
        criteria.key_events_only = true;
        assert_eq!(visible_ids(&events, &criteria), vec![EventId(1), EventId(3)]);

        criteria.key_events_only = false;
        criteria.search_text = "TARIFF".to_string();
        assert_eq!(visible_ids(&events, &criteria), vec![EventId(0)]);

        criteria.search_text = "notes for quota".to_string();
        assert_eq!(visible_ids(&events, &criteria), vec![EventId(2)]);
    }

    #[test]
    fn search_keeps_surrounding_spaces() {
        let events = dataset();
        let mut criteria = everything(&events);
        criteria.search_text = "tariff ".to_string();
        assert_eq!(visible_ids(&events, &criteria), vec![EventId(0)]);

        // "announced" only ever ends a title or note
        criteria.search_text = "announced ".to_string();
        assert!(visible_ids(&events, &criteria).is_empty());

        criteria.search_text = "   ".to_string();
        assert_eq!(visible_ids(&events, &criteria).len(), events.len());
    }

    #[test]
    fn filtering_is_idempotent() {
        let events = dataset();
        let mut criteria = everything(&events);
        criteria.topics = OptionFilter::only(criteria.topics.options.clone(), ["steel"]);
        assert_eq!(visible_ids(&events, &criteria), visible_ids(&events, &criteria));
    }
}
