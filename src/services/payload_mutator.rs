//! Payload mutation: pure transform of (schema, action) into a request body.
//!
//! Kept free of I/O and policy state so the key-set invariant is trivially
//! property-testable: the mutated payload always has exactly the schema's
//! field names, no more, no less.

use rand::Rng;
use serde_json::{Map, Value};

use crate::domain::models::{MutationAction, PayloadSchema};

/// Placeholder assigned to every field before mutation.
const BASELINE_VALUE: &str = "test_string";

/// Length of the oversized string sent by [`MutationAction::Overflow`].
const OVERFLOW_LENGTH: usize = 10_000;

/// SQL metacharacter probe sent by [`MutationAction::SqlInjection`].
const SQL_PROBE: &str = "' OR '1'='1";

/// Number sent in place of a string by [`MutationAction::TypeMismatch`].
const MISMATCH_NUMBER: i64 = 12_345;

/// Build a request payload for the schema and overwrite one randomly chosen
/// field according to the action.
///
/// `Standard` returns the baseline unchanged. An empty schema yields an empty
/// payload with no mutation applied and no error. The output's key set always
/// equals the schema's key set exactly.
pub fn generate_mutation_payload<R: Rng>(
    schema: &PayloadSchema,
    action: MutationAction,
    rng: &mut R,
) -> Map<String, Value> {
    let mut payload: Map<String, Value> = schema
        .fields()
        .iter()
        .map(|field| (field.name.clone(), Value::String(BASELINE_VALUE.to_string())))
        .collect();

    if action == MutationAction::Standard || payload.is_empty() {
        return payload;
    }

    let target_index = rng.gen_range(0..schema.len());
    let target_key = schema.fields()[target_index].name.clone();
    let mutated = match action {
        MutationAction::Standard => unreachable!("handled above"),
        MutationAction::NullInjection => Value::Null,
        MutationAction::SqlInjection => Value::String(SQL_PROBE.to_string()),
        MutationAction::Overflow => Value::String("A".repeat(OVERFLOW_LENGTH)),
        MutationAction::TypeMismatch => Value::Number(MISMATCH_NUMBER.into()),
    };
    payload.insert(target_key, mutated);
    payload
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::domain::models::PayloadSchema;

    fn user_schema() -> PayloadSchema {
        PayloadSchema::from_pairs([("name", "string"), ("email", "string"), ("age", "number")])
    }

    #[test]
    fn standard_keeps_baseline_values() {
        let mut rng = StdRng::seed_from_u64(1);
        let payload =
            generate_mutation_payload(&user_schema(), MutationAction::Standard, &mut rng);
        assert_eq!(payload.len(), 3);
        assert!(payload
            .values()
            .all(|v| v == &Value::String(BASELINE_VALUE.to_string())));
    }

    #[test]
    fn null_injection_nulls_exactly_one_field() {
        let mut rng = StdRng::seed_from_u64(2);
        let payload =
            generate_mutation_payload(&user_schema(), MutationAction::NullInjection, &mut rng);
        let nulls = payload.values().filter(|v| v.is_null()).count();
        assert_eq!(nulls, 1);
    }

    #[test]
    fn sql_injection_plants_the_probe_string() {
        let mut rng = StdRng::seed_from_u64(3);
        let payload =
            generate_mutation_payload(&user_schema(), MutationAction::SqlInjection, &mut rng);
        assert!(payload
            .values()
            .any(|v| v == &Value::String(SQL_PROBE.to_string())));
    }

    #[test]
    fn overflow_sends_ten_thousand_characters() {
        let mut rng = StdRng::seed_from_u64(4);
        let payload = generate_mutation_payload(&user_schema(), MutationAction::Overflow, &mut rng);
        let oversized = payload
            .values()
            .filter_map(Value::as_str)
            .any(|s| s.len() == OVERFLOW_LENGTH);
        assert!(oversized);
    }

    #[test]
    fn type_mismatch_sends_a_number() {
        let mut rng = StdRng::seed_from_u64(5);
        let payload =
            generate_mutation_payload(&user_schema(), MutationAction::TypeMismatch, &mut rng);
        let numbers = payload.values().filter(|v| v.is_number()).count();
        assert_eq!(numbers, 1);
    }

    #[test]
    fn empty_schema_yields_empty_payload_without_error() {
        let mut rng = StdRng::seed_from_u64(6);
        for action in MutationAction::ALL {
            let payload = generate_mutation_payload(&PayloadSchema::new(), action, &mut rng);
            assert!(payload.is_empty());
        }
    }

    proptest! {
        /// For any schema and any action, the mutated payload's key set equals
        /// the schema's key set.
        #[test]
        fn key_set_invariant(
            names in proptest::collection::btree_set("[a-z_]{1,12}", 0..8),
            action_index in 0usize..5,
            seed in any::<u64>(),
        ) {
            let schema = PayloadSchema::from_pairs(
                names.iter().map(|n| (n.as_str(), "string")),
            );
            let action = MutationAction::ALL[action_index];
            let mut rng = StdRng::seed_from_u64(seed);

            let payload = generate_mutation_payload(&schema, action, &mut rng);

            let payload_keys: std::collections::BTreeSet<&str> =
                payload.keys().map(String::as_str).collect();
            let schema_keys: std::collections::BTreeSet<&str> =
                names.iter().map(String::as_str).collect();
            prop_assert_eq!(payload_keys, schema_keys);
        }
    }
}
