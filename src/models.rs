use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Column names of `learning_data`, in insert order.
pub const COLUMNS: [&str; FIELD_COUNT] = [
    "Serial_no",
    "Date",
    "Time_From",
    "Time_To",
    "Topic",
    "Type_of_Learning",
    "Duration_min",
    "Focus_Level",
    "Difficulty",
    "Energy_Level",
    "Distraction_Level",
    "Completion_Percentage",
    "Learning_Mode",
    "Completion_Rate",
];

pub const FIELD_COUNT: usize = 14;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// One logged study session, keyed by a caller-assigned serial number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningRecord {
    pub serial_no: i64,
    pub date: NaiveDate,
    pub time_from: NaiveTime,
    pub time_to: NaiveTime,
    pub topic: String,
    pub type_of_learning: String,
    pub duration_min: i64,
    pub focus_level: i64,
    pub difficulty: i64,
    pub energy_level: i64,
    pub distraction_level: i64,
    pub completion_percentage: f64,
    pub learning_mode: String,
    pub completion_rate: f64,
}

/// Every field of a record except its key. This is what an update replaces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordFields {
    pub date: NaiveDate,
    pub time_from: NaiveTime,
    pub time_to: NaiveTime,
    pub topic: String,
    pub type_of_learning: String,
    pub duration_min: i64,
    pub focus_level: i64,
    pub difficulty: i64,
    pub energy_level: i64,
    pub distraction_level: i64,
    pub completion_percentage: f64,
    pub learning_mode: String,
    pub completion_rate: f64,
}

impl LearningRecord {
    pub fn from_parts(serial_no: i64, fields: RecordFields) -> Self {
        Self {
            serial_no,
            date: fields.date,
            time_from: fields.time_from,
            time_to: fields.time_to,
            topic: fields.topic,
            type_of_learning: fields.type_of_learning,
            duration_min: fields.duration_min,
            focus_level: fields.focus_level,
            difficulty: fields.difficulty,
            energy_level: fields.energy_level,
            distraction_level: fields.distraction_level,
            completion_percentage: fields.completion_percentage,
            learning_mode: fields.learning_mode,
            completion_rate: fields.completion_rate,
        }
    }

    pub fn fields(&self) -> RecordFields {
        RecordFields {
            date: self.date,
            time_from: self.time_from,
            time_to: self.time_to,
            topic: self.topic.clone(),
            type_of_learning: self.type_of_learning.clone(),
            duration_min: self.duration_min,
            focus_level: self.focus_level,
            difficulty: self.difficulty,
            energy_level: self.energy_level,
            distraction_level: self.distraction_level,
            completion_percentage: self.completion_percentage,
            learning_mode: self.learning_mode.clone(),
            completion_rate: self.completion_rate,
        }
    }

    /// Display strings for each column, in `COLUMNS` order.
    pub fn cells(&self) -> [String; FIELD_COUNT] {
        [
            self.serial_no.to_string(),
            self.date.format(DATE_FORMAT).to_string(),
            format_time(self.time_from),
            format_time(self.time_to),
            self.topic.clone(),
            self.type_of_learning.clone(),
            self.duration_min.to_string(),
            self.focus_level.to_string(),
            self.difficulty.to_string(),
            self.energy_level.to_string(),
            self.distraction_level.to_string(),
            self.completion_percentage.to_string(),
            self.learning_mode.clone(),
            self.completion_rate.to_string(),
        ]
    }
}

pub fn format_time(t: NaiveTime) -> String {
    if t.second() == 0 {
        t.format("%H:%M").to_string()
    } else {
        t.format("%H:%M:%S").to_string()
    }
}

/// Raw text of the add/edit form, one entry per column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordForm {
    pub values: [String; FIELD_COUNT],
}

impl RecordForm {
    pub fn from_record(record: &LearningRecord) -> Self {
        Self {
            values: record.cells(),
        }
    }

    pub fn set(&mut self, index: usize, value: impl Into<String>) {
        if let Some(slot) = self.values.get_mut(index) {
            *slot = value.into();
        }
    }

    /// Every field is required; after that each value must parse as its column type.
    pub fn parse(&self) -> Result<LearningRecord, ValidationError> {
        if let Some(i) = self.values.iter().position(|v| v.trim().is_empty()) {
            return Err(ValidationError::MissingField(COLUMNS[i]));
        }

        let v: Vec<&str> = self.values.iter().map(|s| s.trim()).collect();

        Ok(LearningRecord {
            serial_no: parse_int(COLUMNS[0], v[0])?,
            date: parse_date(COLUMNS[1], v[1])?,
            time_from: parse_time(COLUMNS[2], v[2])?,
            time_to: parse_time(COLUMNS[3], v[3])?,
            topic: v[4].to_string(),
            type_of_learning: v[5].to_string(),
            duration_min: parse_int(COLUMNS[6], v[6])?,
            focus_level: parse_int(COLUMNS[7], v[7])?,
            difficulty: parse_int(COLUMNS[8], v[8])?,
            energy_level: parse_int(COLUMNS[9], v[9])?,
            distraction_level: parse_int(COLUMNS[10], v[10])?,
            completion_percentage: parse_float(COLUMNS[11], v[11])?,
            learning_mode: v[12].to_string(),
            completion_rate: parse_float(COLUMNS[13], v[13])?,
        })
    }
}

fn parse_int(field: &'static str, value: &str) -> Result<i64, ValidationError> {
    value.parse().map_err(|_| ValidationError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

// NaN and infinities parse as f64 but cannot be stored
fn parse_float(field: &'static str, value: &str) -> Result<f64, ValidationError> {
    value
        .trim_end_matches('%')
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| ValidationError::InvalidNumber {
            field,
            value: value.to_string(),
        })
}

fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| ValidationError::InvalidDate {
        field,
        value: value.to_string(),
    })
}

fn parse_time(field: &'static str, value: &str) -> Result<NaiveTime, ValidationError> {
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|_| ValidationError::InvalidTime {
            field,
            value: value.to_string(),
        })
}

// JSON output wrapper
#[derive(Debug, Serialize)]
pub struct JsonOutput<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_record(serial_no: i64) -> LearningRecord {
    LearningRecord {
        serial_no,
        date: NaiveDate::from_ymd_opt(2024, 3, 14).unwrap(),
        time_from: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        time_to: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
        topic: "Math".to_string(),
        type_of_learning: "Reading".to_string(),
        duration_min: 30,
        focus_level: 3,
        difficulty: 2,
        energy_level: 4,
        distraction_level: 1,
        completion_percentage: 75.0,
        learning_mode: "Online".to_string(),
        completion_rate: 80.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_form() -> RecordForm {
        let mut form = RecordForm::default();
        for (i, value) in [
            "12",
            "2024-05-01",
            "18:00",
            "19:15:30",
            "Rust",
            "Video",
            "75",
            "4",
            "3",
            "2",
            "1",
            "90%",
            "Offline",
            "85.5",
        ]
        .into_iter()
        .enumerate()
        {
            form.set(i, value);
        }
        form
    }

    mod record_tests {
        use super::*;

        #[test]
        fn fields_round_trip_through_from_parts() {
            let record = sample_record(4);
            let rebuilt = LearningRecord::from_parts(4, record.fields());
            assert_eq!(rebuilt, record);
        }

        #[test]
        fn cells_follow_column_order() {
            let cells = sample_record(9).cells();
            assert_eq!(cells[0], "9");
            assert_eq!(cells[1], "2024-03-14");
            assert_eq!(cells[2], "09:00");
            assert_eq!(cells[4], "Math");
            assert_eq!(cells[12], "Online");
            assert_eq!(cells[13], "80");
        }

        #[test]
        fn format_time_keeps_seconds_when_present() {
            let t = NaiveTime::from_hms_opt(7, 5, 9).unwrap();
            assert_eq!(format_time(t), "07:05:09");
            let t = NaiveTime::from_hms_opt(7, 5, 0).unwrap();
            assert_eq!(format_time(t), "07:05");
        }
    }

    mod form_tests {
        use super::*;

        #[test]
        fn parse_complete_form() {
            let record = filled_form().parse().unwrap();
            assert_eq!(record.serial_no, 12);
            assert_eq!(record.date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
            assert_eq!(record.time_from, NaiveTime::from_hms_opt(18, 0, 0).unwrap());
            assert_eq!(record.time_to, NaiveTime::from_hms_opt(19, 15, 30).unwrap());
            assert_eq!(record.topic, "Rust");
            assert_eq!(record.duration_min, 75);
            assert_eq!(record.completion_percentage, 90.0);
            assert_eq!(record.learning_mode, "Offline");
            assert_eq!(record.completion_rate, 85.5);
        }

        #[test]
        fn blank_field_is_rejected() {
            let mut form = filled_form();
            form.set(4, "   ");
            assert_eq!(form.parse(), Err(ValidationError::MissingField("Topic")));
        }

        #[test]
        fn first_blank_field_is_reported() {
            let form = RecordForm::default();
            assert_eq!(form.parse(), Err(ValidationError::MissingField("Serial_no")));
        }

        #[test]
        fn non_numeric_duration_is_rejected() {
            let mut form = filled_form();
            form.set(6, "half an hour");
            assert!(matches!(
                form.parse(),
                Err(ValidationError::InvalidNumber { field: "Duration_min", .. })
            ));
        }

        #[test]
        fn non_finite_rates_are_rejected() {
            for value in ["NaN", "inf", "-infinity", "NaN%"] {
                let mut form = RecordForm::from_record(&sample_record(5));
                form.set(13, value);
                assert!(
                    matches!(
                        form.parse(),
                        Err(ValidationError::InvalidNumber { field: "Completion_Rate", .. })
                    ),
                    "{} should be rejected",
                    value
                );
            }
        }

        #[test]
        fn bad_date_is_rejected() {
            let mut form = filled_form();
            form.set(1, "01/05/2024");
            assert!(matches!(form.parse(), Err(ValidationError::InvalidDate { .. })));
        }

        #[test]
        fn bad_time_is_rejected() {
            let mut form = filled_form();
            form.set(2, "6pm");
            assert!(matches!(
                form.parse(),
                Err(ValidationError::InvalidTime { field: "Time_From", .. })
            ));
        }

        #[test]
        fn ratings_are_not_range_checked() {
            let mut form = filled_form();
            form.set(7, "42");
            assert_eq!(form.parse().unwrap().focus_level, 42);
        }

        #[test]
        fn from_record_parses_back_to_same_record() {
            let record = sample_record(3);
            let parsed = RecordForm::from_record(&record).parse().unwrap();
            assert_eq!(parsed, record);
        }

        #[test]
        fn set_out_of_range_is_ignored() {
            let mut form = RecordForm::default();
            form.set(FIELD_COUNT, "x");
            assert!(form.values.iter().all(|v| v.is_empty()));
        }
    }

    mod json_output_tests {
        use super::*;

        #[test]
        fn serializes_ok_correctly() {
            let output = JsonOutput::ok(42);
            let json = serde_json::to_string(&output).unwrap();
            assert_eq!(json, r#"{"success":true,"data":42,"error":null}"#);
        }

        #[test]
        fn serializes_err_correctly() {
            let output: JsonOutput<()> = JsonOutput::err("No record found");
            let json = serde_json::to_string(&output).unwrap();
            assert_eq!(
                json,
                r#"{"success":false,"data":null,"error":"No record found"}"#
            );
        }
    }
}
