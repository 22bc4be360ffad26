// src/scrape/results.rs
// Event results arrive as JSON whose field names drift across event types and
// site versions. Each value is resolved through a precedence list of the
// spellings seen in the wild; first non-empty wins, absence never errors.

use std::collections::BTreeSet;
use std::error::Error;

use serde_json::Value;

const EVENT_NAME_FIELDS: &[&str] = &["long_desc", "event_label"];
const RACE_LABEL_FIELDS: &[&str] = &["stageName", "displayNumber", "raceName"];
const CLUB_FIELDS: &[&str] = &["orgName", "longName"];
const PLACE_FIELDS: &[&str] = &["place", "orderOfFinishPlace", "finishPlace", "officialPlace"];
const FINISH_FIELDS: &[&str] = &[
    "finishTimeString",
    "adjustedTimeString",
    "rawTimeString",
    "officialTimeString",
];
const MARGIN_FIELDS: &[&str] = &["marginString", "adjustedTimeDeltaString", "officialMarginString"];

/// One boat's placement in one race-heat. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct RaceRow {
    pub event: String,
    pub race: String,
    /// Site-native string; "999" is the DNS/DNF sentinel.
    pub place: String,
    pub bow: String,
    pub club: String,
    pub finish: String,
    pub margin: String,
    pub boat_id: Option<String>,
    /// Display fallback when no lineup resolves for the boat.
    pub boat_label: String,
    /// Boats that recorded a place in this heat (scratches excluded).
    pub num_boats: usize,
}

/// Uniform rows from one event's raw payload, plus the deduplicated
/// `(job_id, boat_id)` pairs whose lineups are worth fetching.
///
/// `event_name` overrides the payload's own event label when given. Only a
/// payload that is not JSON at all is an error; missing or oddly-named fields
/// degrade to empty strings.
pub fn parse_event_results(
    json_str: &str,
    job_id: &str,
    event_name: Option<&str>,
) -> Result<(Vec<RaceRow>, BTreeSet<(String, String)>), Box<dyn Error>> {
    let data: Value = serde_json::from_str(json_str)?;
    let event = match event_name {
        Some(name) => s!(name),
        None => first_of(&data, EVENT_NAME_FIELDS),
    };

    let mut rows: Vec<RaceRow> = Vec::new();
    let mut boats = BTreeSet::new();
    let no_races = Vec::new();

    for race in data.get("races").and_then(Value::as_array).unwrap_or(&no_races) {
        let label = match first_of(race, RACE_LABEL_FIELDS) {
            l if l.is_empty() => s!("Final"),
            l => l,
        };

        let heat_start = rows.len();
        let mut num_boats = 0;
        for result in race.get("results").and_then(Value::as_array).unwrap_or(&no_races) {
            let place = first_of(result, PLACE_FIELDS);
            // Scratches keep their row but don't count toward the heat size.
            if !place.is_empty() {
                num_boats += 1;
            }

            let boat_id = result.get("boatId").and_then(non_empty);
            if let Some(id) = &boat_id {
                boats.insert((s!(job_id), id.clone()));
            }

            rows.push(RaceRow {
                event: event.clone(),
                race: label.clone(),
                place,
                bow: result.get("lane").map(text_of).unwrap_or_default(),
                club: first_of(result, CLUB_FIELDS),
                finish: first_of(result, FINISH_FIELDS),
                margin: first_of(result, MARGIN_FIELDS),
                boat_id,
                boat_label: first_of(result, &["boatLabel"]),
                num_boats: 0, // stamped below once the heat total is known
            });
        }
        for row in &mut rows[heat_start..] {
            row.num_boats = num_boats;
        }
    }

    Ok((rows, boats))
}

/// First non-empty of `keys`, in order. "Empty" mirrors the site's habit of
/// sending null, "", or 0 for absent values.
pub fn first_of(obj: &Value, keys: &[&str]) -> String {
    keys.iter()
        .find_map(|k| obj.get(*k).and_then(non_empty))
        .unwrap_or_default()
}

fn non_empty(v: &Value) -> Option<String> {
    match v {
        Value::Null => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        _ => match text_of(v) {
            s if s.is_empty() => None,
            s => Some(s),
        },
    }
}

/// Stringify a scalar payload value; arrays/objects render empty.
fn text_of(v: &Value) -> String {
    match v {
        Value::String(t) => s!(t.trim()),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => s!(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_alternate_field_spellings() {
        // Two heats using different schema generations for the same data.
        let payload = r#"{
            "long_desc": "Mens Youth 8+",
            "races": [
                {"stageName": "Heat 1", "results": [
                    {"place": 1, "lane": 3, "orgName": "Lake RC",
                     "finishTimeString": "6:01.2", "marginString": "", "boatId": 11}
                ]},
                {"raceName": "Heat 2", "results": [
                    {"officialPlace": "2", "lane": 4, "longName": "Bay Crew",
                     "rawTimeString": "6:03.9", "officialMarginString": "2.7", "boatId": "12"}
                ]}
            ]
        }"#;
        let (rows, boats) = parse_event_results(payload, "9168", None).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].event, "Mens Youth 8+");
        assert_eq!(rows[0].race, "Heat 1");
        assert_eq!(rows[0].place, "1");
        assert_eq!(rows[0].club, "Lake RC");
        assert_eq!(rows[0].finish, "6:01.2");
        assert_eq!(rows[1].race, "Heat 2");
        assert_eq!(rows[1].place, "2");
        assert_eq!(rows[1].club, "Bay Crew");
        assert_eq!(rows[1].finish, "6:03.9");
        assert_eq!(rows[1].margin, "2.7");
        let ids: Vec<_> = boats.iter().cloned().collect();
        assert_eq!(ids, vec![(s!("9168"), s!("11")), (s!("9168"), s!("12"))]);
    }

    #[test]
    fn race_label_falls_back_to_final() {
        let payload = r#"{"races": [{"results": [{"place": "1"}]}]}"#;
        let (rows, _) = parse_event_results(payload, "1", None).unwrap();
        assert_eq!(rows[0].race, "Final");
    }

    #[test]
    fn display_number_is_stringified() {
        let payload = r#"{"races": [{"displayNumber": 3, "results": [{"place": "1"}]}]}"#;
        let (rows, _) = parse_event_results(payload, "1", None).unwrap();
        assert_eq!(rows[0].race, "3");
    }

    #[test]
    fn placeless_rows_stay_but_do_not_count() {
        let payload = r#"{"races": [{"stageName": "Final", "results": [
            {"place": "1", "finishTimeString": "6:00.0"},
            {"place": "2", "finishTimeString": "6:05.0"},
            {"finishTimeString": ""}
        ]}]}"#;
        let (rows, _) = parse_event_results(payload, "1", None).unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.num_boats == 2));
        assert_eq!(rows[2].place, "");
    }

    #[test]
    fn boat_ids_dedup_across_heats() {
        let payload = r#"{"races": [
            {"stageName": "Heat 1", "results": [{"place": "1", "boatId": 7}]},
            {"stageName": "Final", "results": [{"place": "1", "boatId": 7}]}
        ]}"#;
        let (rows, boats) = parse_event_results(payload, "42", None).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(boats.len(), 1);
    }

    #[test]
    fn zero_and_null_boat_ids_are_absent() {
        let payload = r#"{"races": [{"results": [
            {"place": "1", "boatId": 0, "boatLabel": "Lake RC A"},
            {"place": "2", "boatId": null}
        ]}]}"#;
        let (rows, boats) = parse_event_results(payload, "1", None).unwrap();
        assert!(boats.is_empty());
        assert_eq!(rows[0].boat_id, None);
        assert_eq!(rows[0].boat_label, "Lake RC A");
    }

    #[test]
    fn explicit_event_name_wins() {
        let payload = r#"{"long_desc": "from payload", "races": []}"#;
        let (rows, _) = parse_event_results(payload, "1", Some("override")).unwrap();
        assert!(rows.is_empty());
        let payload = r#"{"long_desc": "from payload", "races": [{"results": [{"place":"1"}]}]}"#;
        let (rows, _) = parse_event_results(payload, "1", Some("override")).unwrap();
        assert_eq!(rows[0].event, "override");
    }

    #[test]
    fn garbage_payload_is_an_error() {
        assert!(parse_event_results("<html>cf challenge</html>", "1", None).is_err());
    }

    #[test]
    fn missing_races_key_yields_nothing() {
        let (rows, boats) = parse_event_results("{}", "1", None).unwrap();
        assert!(rows.is_empty());
        assert!(boats.is_empty());
    }
}
