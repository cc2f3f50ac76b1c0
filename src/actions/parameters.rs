//! The guarded value-collection flow shared by action parameters and create dialogs.

use crate::framework::{DialogField, DialogOutcome, DialogService, ValueDialog};
use crate::model::EntityData;
use serde_json::Value;
use tracing::debug;

/// Asks for `fields` until every required one is filled.
///
/// Returns `None` when the user cancels.
pub(crate) async fn collect_values(
    dialogs: &dyn DialogService,
    title: &str,
    fields: Vec<DialogField>,
    prefilled: EntityData,
) -> Option<EntityData> {
    let mut values = prefilled;
    let mut missing = Vec::new();
    loop {
        let dialog = ValueDialog {
            title: title.to_string(),
            fields: fields.clone(),
            values: values.clone(),
            missing: missing.clone(),
        };
        match dialogs.collect_values(dialog).await {
            DialogOutcome::Cancelled => return None,
            DialogOutcome::Confirmed(entered) => values.extend(entered),
        }

        missing = missing_required(&fields, &values);
        if missing.is_empty() {
            return Some(values);
        }
        debug!(dialog = title, ?missing, "Required values missing");
    }
}

pub(crate) fn missing_required(fields: &[DialogField], values: &EntityData) -> Vec<String> {
    fields
        .iter()
        .filter(|f| f.required && !is_filled(values.get(&f.name)))
        .map(|f| f.name.clone())
        .collect()
}

fn is_filled(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::mock::ScriptedDialogs;
    use serde_json::json;

    fn fields() -> Vec<DialogField> {
        vec![
            DialogField {
                name: "Reason".into(),
                label: "Reason".into(),
                required: true,
            },
            DialogField {
                name: "Note".into(),
                label: "Note".into(),
                required: false,
            },
        ]
    }

    fn data(value: serde_json::Value) -> EntityData {
        value.as_object().cloned().unwrap_or_default()
    }

    #[tokio::test]
    async fn reopens_until_required_values_are_filled() {
        let dialogs = ScriptedDialogs::new();
        dialogs.expect_values(DialogOutcome::Confirmed(data(json!({ "Reason": " " }))));
        dialogs.expect_values(DialogOutcome::Confirmed(data(json!({ "Reason": "Damaged" }))));

        let values = collect_values(&dialogs, "Reject", fields(), data(json!({ "Note": "n/a" })))
            .await
            .unwrap();
        assert_eq!(values, data(json!({ "Note": "n/a", "Reason": "Damaged" })));

        let prompts = dialogs.value_dialogs();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[0].missing.is_empty());
        assert_eq!(prompts[1].missing, ["Reason"]);
        dialogs.verify();
    }

    #[tokio::test]
    async fn cancel_returns_none() {
        let dialogs = ScriptedDialogs::new();
        dialogs.expect_values(DialogOutcome::Cancelled);
        assert!(collect_values(&dialogs, "Reject", fields(), EntityData::new())
            .await
            .is_none());
    }

    #[test]
    fn null_and_blank_are_missing() {
        let values = data(json!({ "Reason": null }));
        assert_eq!(missing_required(&fields(), &values), ["Reason"]);
        let values = data(json!({ "Reason": 0 }));
        assert!(missing_required(&fields(), &values).is_empty());
    }
}
