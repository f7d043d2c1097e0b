use crate::config::IntentSettings;
use crate::traits::IntentExtractor;
use crate::{IntentSlots, StoreError};
use async_trait::async_trait;
use aws_sdk_lexruntimev2::error::DisplayErrorContext;
use aws_sdk_lexruntimev2::operation::recognize_text::RecognizeTextOutput;
use aws_sdk_lexruntimev2::Client;

pub struct LexIntentExtractor {
    client: Client,
    settings: IntentSettings,
}

impl LexIntentExtractor {
    pub fn new(client: Client, settings: IntentSettings) -> Self {
        Self { client, settings }
    }
}

#[async_trait]
impl IntentExtractor for LexIntentExtractor {
    async fn extract_slots(&self, text: &str) -> Result<Option<IntentSlots>, StoreError> {
        let output = self
            .client
            .recognize_text()
            .bot_id(&self.settings.bot_id)
            .bot_alias_id(&self.settings.bot_alias_id)
            .locale_id(&self.settings.locale_id)
            .session_id(&self.settings.session_id)
            .text(text)
            .send()
            .await
            .map_err(|error| StoreError::service("lex", DisplayErrorContext(&error).to_string()))?;

        Ok(slots_from_output(&output))
    }
}

/// Original slot text keyed by slot name. `None` without a recognised intent;
/// slots lacking a value are left out.
pub fn slots_from_output(output: &RecognizeTextOutput) -> Option<IntentSlots> {
    let intent = output.session_state().and_then(|state| state.intent())?;

    let mut slots = IntentSlots::new();
    for (name, slot) in intent.slots().into_iter().flatten() {
        if let Some(value) = slot.value().and_then(|value| value.original_value()) {
            slots.insert(name.clone(), value);
        }
    }

    Some(slots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keywords::{keywords_from_slots, PRIMARY_SLOT, SECONDARY_SLOT};
    use aws_sdk_lexruntimev2::types::{Intent, SessionState, Slot, Value};

    fn filled(text: &str) -> Slot {
        Slot::builder()
            .value(
                Value::builder()
                    .original_value(text)
                    .interpreted_value(text.to_lowercase())
                    .build()
                    .expect("value builds"),
            )
            .build()
    }

    fn output_with(intent: Intent) -> RecognizeTextOutput {
        RecognizeTextOutput::builder()
            .session_state(SessionState::builder().intent(intent).build())
            .build()
    }

    #[test]
    fn no_session_state_means_no_structured_result() {
        let output = RecognizeTextOutput::builder().session_id("test-session").build();
        assert_eq!(slots_from_output(&output), None);
    }

    #[test]
    fn unfilled_slot_is_absent() {
        let intent = Intent::builder()
            .name("SearchIntent")
            .slots(PRIMARY_SLOT, Slot::builder().build())
            .build()
            .expect("intent builds");

        let slots = slots_from_output(&output_with(intent)).expect("intent recognised");

        assert_eq!(slots.get(PRIMARY_SLOT), None);
        assert!(slots.is_empty());
        assert!(keywords_from_slots(&slots).is_empty());
    }

    #[test]
    fn both_label_slots_carry_their_original_text() {
        let intent = Intent::builder()
            .name("SearchIntent")
            .slots(PRIMARY_SLOT, filled("Dogs"))
            .slots(SECONDARY_SLOT, filled("Beaches"))
            .build()
            .expect("intent builds");

        let slots = slots_from_output(&output_with(intent)).expect("intent recognised");

        assert_eq!(slots.get(PRIMARY_SLOT), Some("Dogs"));
        assert_eq!(slots.get(SECONDARY_SLOT), Some("Beaches"));
        assert_eq!(keywords_from_slots(&slots), vec!["dogs", "beaches"]);
    }
}
