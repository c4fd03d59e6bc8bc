//! Inbound commands — manual zone toggles and program CRUD requests.
//!
//! Payloads arrive as loosely typed JSON. They are validated here, once,
//! into typed commands; the first violated rule wins and its
//! [`ValidationError`] message is what the sender gets back.

use serde_json::{Map, Value};

use crate::error::ValidationError;
use crate::id::ProgramId;
use crate::program::{MAX_DURATION_SECS, NewProgram, ProgramPatch};
use crate::schedule::{TimeOfDay, WeekdaySet};
use crate::zone::ZoneId;

/// Manual override: toggle `zone`, optionally for a bounded time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneCommand {
    pub zone: ZoneId,
    /// Requested run time in seconds. Absent, zero or negative means "until
    /// switched off".
    pub duration_secs: Option<i64>,
}

impl ZoneCommand {
    /// Parse `{"zone": "zone_3", "time": 120}`.
    ///
    /// A `time` that is not a number is treated as absent.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidZone`] when `zone` is missing or not
    /// one of the board's zones.
    pub fn from_json(value: &Value) -> Result<Self, ValidationError> {
        let zone = value
            .get("zone")
            .and_then(Value::as_str)
            .ok_or(ValidationError::InvalidZone)?
            .parse()?;
        let duration_secs = value.get("time").and_then(whole_seconds);
        Ok(Self {
            zone,
            duration_secs,
        })
    }
}

#[allow(clippy::cast_possible_truncation)]
fn whole_seconds(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|secs| secs.trunc() as i64))
}

/// A validated program CRUD request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgramCommand {
    Create(NewProgram),
    Edit { id: ProgramId, patch: ProgramPatch },
    Delete { id: ProgramId },
}

impl ProgramCommand {
    /// Parse and validate
    /// `{"action": "create"|"edit"|"delete", "id": 3, "program": {...}}`.
    ///
    /// `create` requires every program field; `edit` validates only the
    /// fields present; `delete` only needs `id`.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] encountered. `delete` checks
    /// only the id; `edit` checks program data, then id; both mutating
    /// actions then check name, zone, `active_day`, `start_time`, duration,
    /// `is_active` and `is_running` in that order.
    pub fn from_json(value: &Value) -> Result<Self, ValidationError> {
        let action = value
            .get("action")
            .and_then(Value::as_str)
            .ok_or(ValidationError::InvalidAction)?;

        match action {
            "delete" => Ok(Self::Delete {
                id: parse_id(value)?,
            }),
            "edit" => {
                let program = program_object(value)?;
                let id = parse_id(value)?;
                Ok(Self::Edit {
                    id,
                    patch: parse_patch(program)?,
                })
            }
            "create" => {
                let program = program_object(value)?;
                Ok(Self::Create(parse_new_program(program)?))
            }
            _ => Err(ValidationError::InvalidAction),
        }
    }
}

fn parse_id(value: &Value) -> Result<ProgramId, ValidationError> {
    match value.get("id") {
        None | Some(Value::Null) => Err(ValidationError::MissingId),
        Some(id) => id
            .as_i64()
            .map(ProgramId::from_row)
            .ok_or(ValidationError::InvalidId),
    }
}

fn program_object(value: &Value) -> Result<&Map<String, Value>, ValidationError> {
    value
        .get("program")
        .and_then(Value::as_object)
        .ok_or(ValidationError::MissingProgram)
}

fn parse_new_program(program: &Map<String, Value>) -> Result<NewProgram, ValidationError> {
    let required = |key: &str, err: ValidationError| program.get(key).ok_or(err);

    let name = name_field(required("name", ValidationError::InvalidName)?)?;
    let zone = zone_field(required("zone", ValidationError::InvalidZone)?)?;
    let active_days = days_field(required("active_day", ValidationError::InvalidActiveDay)?)?;
    let start_time = start_field(required("start_time", ValidationError::InvalidStartTime)?)?;
    let duration_secs = duration_field(required("duration", ValidationError::InvalidDuration)?)?;
    let is_active = bool_field(
        required("is_active", ValidationError::InvalidIsActive)?,
        ValidationError::InvalidIsActive,
    )?;
    let is_running = bool_field(
        required("is_running", ValidationError::InvalidIsRunning)?,
        ValidationError::InvalidIsRunning,
    )?;

    Ok(NewProgram {
        name,
        zone,
        active_days,
        start_time,
        duration_secs,
        is_active,
        is_running,
    })
}

fn parse_patch(program: &Map<String, Value>) -> Result<ProgramPatch, ValidationError> {
    Ok(ProgramPatch {
        name: program.get("name").map(name_field).transpose()?,
        zone: program.get("zone").map(zone_field).transpose()?,
        active_days: program.get("active_day").map(days_field).transpose()?,
        start_time: program.get("start_time").map(start_field).transpose()?,
        duration_secs: program.get("duration").map(duration_field).transpose()?,
        is_active: program
            .get("is_active")
            .map(|v| bool_field(v, ValidationError::InvalidIsActive))
            .transpose()?,
        is_running: program
            .get("is_running")
            .map(|v| bool_field(v, ValidationError::InvalidIsRunning))
            .transpose()?,
    })
}

fn name_field(value: &Value) -> Result<String, ValidationError> {
    value
        .as_str()
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
        .ok_or(ValidationError::InvalidName)
}

fn zone_field(value: &Value) -> Result<ZoneId, ValidationError> {
    value
        .as_str()
        .ok_or(ValidationError::InvalidZone)?
        .parse()
}

fn days_field(value: &Value) -> Result<WeekdaySet, ValidationError> {
    value
        .as_str()
        .ok_or(ValidationError::InvalidActiveDay)?
        .parse()
}

fn start_field(value: &Value) -> Result<TimeOfDay, ValidationError> {
    value
        .as_str()
        .ok_or(ValidationError::InvalidStartTime)?
        .parse()
}

fn duration_field(value: &Value) -> Result<u32, ValidationError> {
    value
        .as_u64()
        .and_then(|secs| u32::try_from(secs).ok())
        .filter(|secs| *secs <= MAX_DURATION_SECS)
        .ok_or(ValidationError::InvalidDuration)
}

fn bool_field(value: &Value, err: ValidationError) -> Result<bool, ValidationError> {
    value.as_bool().ok_or(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_program() -> Value {
        json!({
            "name": "Lawn",
            "zone": "zone_2",
            "active_day": "1-3-5",
            "start_time": "06:00",
            "duration": 600,
            "is_active": true,
            "is_running": false,
        })
    }

    fn create_without(field: &str) -> Value {
        let mut program = full_program();
        program.as_object_mut().unwrap().remove(field);
        json!({"action": "create", "program": program})
    }

    fn create_with(field: &str, value: Value) -> Value {
        let mut program = full_program();
        program[field] = value;
        json!({"action": "create", "program": program})
    }

    #[test]
    fn should_parse_zone_command_with_time() {
        let cmd = ZoneCommand::from_json(&json!({"zone": "zone_3", "time": 120})).unwrap();
        assert_eq!(cmd.zone, ZoneId::Zone3);
        assert_eq!(cmd.duration_secs, Some(120));
    }

    #[test]
    fn should_parse_zone_command_without_time() {
        let cmd = ZoneCommand::from_json(&json!({"zone": "zone_1"})).unwrap();
        assert_eq!(cmd.duration_secs, None);

        let cmd = ZoneCommand::from_json(&json!({"zone": "zone_1", "time": null})).unwrap();
        assert_eq!(cmd.duration_secs, None);
    }

    #[test]
    fn should_truncate_fractional_zone_time() {
        let cmd = ZoneCommand::from_json(&json!({"zone": "zone_1", "time": 30.7})).unwrap();
        assert_eq!(cmd.duration_secs, Some(30));
    }

    #[test]
    fn should_reject_zone_command_with_unknown_zone() {
        let result = ZoneCommand::from_json(&json!({"zone": "zone_12"}));
        assert_eq!(result, Err(ValidationError::InvalidZone));
        let result = ZoneCommand::from_json(&json!({"time": 5}));
        assert_eq!(result, Err(ValidationError::InvalidZone));
    }

    #[test]
    fn should_parse_well_formed_create() {
        let cmd =
            ProgramCommand::from_json(&json!({"action": "create", "program": full_program()}))
                .unwrap();
        let ProgramCommand::Create(program) = cmd else {
            panic!("expected a create command");
        };
        assert_eq!(program.name, "Lawn");
        assert_eq!(program.zone, ZoneId::Zone2);
        assert_eq!(program.active_days.to_string(), "1-3-5");
        assert_eq!(program.start_time.to_string(), "06:00");
        assert_eq!(program.duration_secs, 600);
        assert!(program.is_active);
        assert!(!program.is_running);
    }

    #[test]
    fn should_reject_invalid_or_missing_action() {
        assert_eq!(
            ProgramCommand::from_json(&json!({"action": "rename"})),
            Err(ValidationError::InvalidAction)
        );
        assert_eq!(
            ProgramCommand::from_json(&json!({})),
            Err(ValidationError::InvalidAction)
        );
    }

    #[test]
    fn should_report_missing_name_on_create() {
        let result = ProgramCommand::from_json(&create_without("name"));
        assert_eq!(result, Err(ValidationError::InvalidName));
        assert_eq!(
            result.unwrap_err().to_string(),
            "Invalid or missing name."
        );
    }

    #[test]
    fn should_report_each_missing_field_on_create() {
        let cases = [
            ("zone", ValidationError::InvalidZone),
            ("active_day", ValidationError::InvalidActiveDay),
            ("start_time", ValidationError::InvalidStartTime),
            ("duration", ValidationError::InvalidDuration),
            ("is_active", ValidationError::InvalidIsActive),
            ("is_running", ValidationError::InvalidIsRunning),
        ];
        for (field, expected) in cases {
            assert_eq!(
                ProgramCommand::from_json(&create_without(field)),
                Err(expected),
                "missing {field}"
            );
        }
    }

    #[test]
    fn should_reject_malformed_fields_on_create() {
        let cases = [
            ("zone", json!("zone_9"), ValidationError::InvalidZone),
            ("active_day", json!("1,3"), ValidationError::InvalidActiveDay),
            ("start_time", json!("6:00"), ValidationError::InvalidStartTime),
            ("duration", json!(3601), ValidationError::InvalidDuration),
            ("duration", json!(-1), ValidationError::InvalidDuration),
            ("duration", json!("600"), ValidationError::InvalidDuration),
            ("is_active", json!("yes"), ValidationError::InvalidIsActive),
            ("is_running", json!(0), ValidationError::InvalidIsRunning),
            ("name", json!(""), ValidationError::InvalidName),
        ];
        for (field, value, expected) in cases {
            assert_eq!(
                ProgramCommand::from_json(&create_with(field, value.clone())),
                Err(expected),
                "{field} = {value}"
            );
        }
    }

    #[test]
    fn should_report_first_failing_field_in_order() {
        let cmd = json!({
            "action": "create",
            "program": {"name": "Lawn", "zone": "nope", "active_day": "9"},
        });
        assert_eq!(
            ProgramCommand::from_json(&cmd),
            Err(ValidationError::InvalidZone)
        );
    }

    #[test]
    fn should_require_program_data_for_create_and_edit() {
        assert_eq!(
            ProgramCommand::from_json(&json!({"action": "create"})),
            Err(ValidationError::MissingProgram)
        );
        assert_eq!(
            ProgramCommand::from_json(&json!({"action": "edit", "id": 1})),
            Err(ValidationError::MissingProgram)
        );
    }

    #[test]
    fn should_require_id_for_edit_and_delete() {
        assert_eq!(
            ProgramCommand::from_json(&json!({"action": "delete"})),
            Err(ValidationError::MissingId)
        );
        assert_eq!(
            ProgramCommand::from_json(&json!({"action": "edit", "program": {}})),
            Err(ValidationError::MissingId)
        );
        assert_eq!(
            ProgramCommand::from_json(&json!({"action": "delete", "id": "x"})),
            Err(ValidationError::InvalidId)
        );
    }

    #[test]
    fn should_parse_delete() {
        let cmd = ProgramCommand::from_json(&json!({"action": "delete", "id": 4})).unwrap();
        assert_eq!(
            cmd,
            ProgramCommand::Delete {
                id: ProgramId::from_row(4)
            }
        );
    }

    #[test]
    fn should_validate_only_present_fields_on_edit() {
        let cmd = ProgramCommand::from_json(&json!({
            "action": "edit",
            "id": 2,
            "program": {"duration": 900, "is_active": false},
        }))
        .unwrap();
        assert_eq!(
            cmd,
            ProgramCommand::Edit {
                id: ProgramId::from_row(2),
                patch: ProgramPatch {
                    duration_secs: Some(900),
                    is_active: Some(false),
                    ..ProgramPatch::default()
                },
            }
        );
    }

    #[test]
    fn should_reject_malformed_present_field_on_edit() {
        let result = ProgramCommand::from_json(&json!({
            "action": "edit",
            "id": 2,
            "program": {"start_time": "25:00"},
        }));
        assert_eq!(result, Err(ValidationError::InvalidStartTime));

        let result = ProgramCommand::from_json(&json!({
            "action": "edit",
            "id": 2,
            "program": {"duration": 4000},
        }));
        assert_eq!(result, Err(ValidationError::InvalidDuration));
    }
}
