//! Position validation ahead of clustering.
//!
//! Records with a malformed position are dropped from the working set and
//! reported; they never abort a run.

use hotspot_map_complaint_models::{ComplaintRecord, MalformedCoordinateError, RawComplaintRecord};

/// A record that was dropped and why.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedRecord {
    /// Id of the dropped record.
    pub id: String,
    /// The validation failure.
    pub error: MalformedCoordinateError,
}

/// Outcome of validating a batch of raw records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatedRecords {
    /// Records that passed, in input order.
    pub records: Vec<ComplaintRecord>,
    /// Records that failed, in input order.
    pub rejected: Vec<RejectedRecord>,
}

/// Validates every record's position, keeping input order.
pub fn validate_records<'a, I>(raw_records: I) -> ValidatedRecords
where
    I: IntoIterator<Item = &'a RawComplaintRecord>,
{
    let mut validated = ValidatedRecords::default();

    for raw in raw_records {
        match ComplaintRecord::from_raw(raw) {
            Ok(record) => validated.records.push(record),
            Err(error) => {
                log::debug!("Dropping complaint {}: {error}", raw.id);
                validated.rejected.push(RejectedRecord {
                    id: raw.id.clone(),
                    error,
                });
            }
        }
    }

    if !validated.rejected.is_empty() {
        log::warn!(
            "Dropped {} of {} complaints with malformed positions",
            validated.rejected.len(),
            validated.rejected.len() + validated.records.len()
        );
    }

    validated
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(id: &str, position: &str) -> RawComplaintRecord {
        RawComplaintRecord {
            id: id.to_string(),
            offence_type: "Road Dust".to_string(),
            position: Some(position.to_string()),
            location_label: format!("Location {id}"),
            ..RawComplaintRecord::default()
        }
    }

    #[test]
    fn keeps_valid_records_in_order() {
        let input = vec![
            raw("a", "28.61,77.20"),
            raw("b", "not a position"),
            raw("c", "28.62,77.21"),
            raw("d", "95.0,77.21"),
        ];

        let validated = validate_records(&input);
        let kept: Vec<&str> = validated.records.iter().map(|r| r.id.as_str()).collect();
        let dropped: Vec<&str> = validated.rejected.iter().map(|r| r.id.as_str()).collect();

        assert_eq!(kept, vec!["a", "c"]);
        assert_eq!(dropped, vec!["b", "d"]);
        assert_eq!(
            validated.rejected[1].error,
            MalformedCoordinateError::LatitudeOutOfRange(95.0)
        );
    }

    #[test]
    fn empty_input_is_fine() {
        let validated = validate_records(&Vec::<RawComplaintRecord>::new());
        assert!(validated.records.is_empty());
        assert!(validated.rejected.is_empty());
    }
}
