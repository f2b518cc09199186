//! Chain semantics: ordering, short-circuit, the required override, faults.

use std::sync::Arc;

use attest_kernel::{
    Decision, Model, Outcome, RuleMap, Rules, RunOptions, Validation, ValidationConfig, Value,
    Verdict,
};
use attest_testutil::{
    CountingValidator, DeferredValidator, FaultyValidator, OrderLog, attrs, entity, init_tracing,
};
use serde_json::json;

fn validation() -> Validation {
    init_tracing();
    Validation::new(ValidationConfig::default()).unwrap()
}

#[tokio::test]
async fn attribute_without_rules_always_passes() {
    let binding = validation()
        .attach(entity(json!({}), Rules::new()))
        .unwrap();
    for value in [Value::Null, Value::from(""), Value::Int(-1), Value::from("x")] {
        assert_eq!(binding.pre_validate("anything", value).await, Verdict::Valid);
    }
}

#[tokio::test]
async fn optional_empty_value_skips_every_other_rule() {
    let counter = CountingValidator::failing("after", "should not run");
    let rules = Rules::new().attr(
        "email",
        RuleMap::new()
            .required(false)
            .pattern("email")
            .min_length(50)
            .func(counter.clone()),
    );
    let binding = validation().attach(entity(json!({}), rules)).unwrap();

    for empty in ["", "   "] {
        assert_eq!(binding.pre_validate("email", empty).await, Verdict::Valid);
    }
    assert_eq!(binding.pre_validate("email", Value::Null).await, Verdict::Valid);
    assert_eq!(counter.calls(), 0);
}

#[tokio::test]
async fn required_empty_value_fails_and_stops() {
    let counter = CountingValidator::passing("after");
    let rules = Rules::new().attr(
        "name",
        RuleMap::new().required(true).func(counter.clone()),
    );
    let binding = validation().attach(entity(json!({}), rules)).unwrap();

    let verdict = binding.pre_validate("name", "").await;
    assert_eq!(verdict, Verdict::Invalid("Name is required".into()));
    assert_eq!(counter.calls(), 0);

    // and a present value reaches the next step
    assert_eq!(binding.pre_validate("name", "amy").await, Verdict::Valid);
    assert_eq!(counter.calls(), 1);
}

#[tokio::test]
async fn dynamic_required_reads_computed_attributes() {
    let rules = Rules::new().attr(
        "zip",
        RuleMap::new().required_if(|_, _, computed| {
            computed.get("country") == Some(&Value::from("US"))
        }),
    );
    let binding = validation()
        .attach(entity(json!({"country": "US", "zip": ""}), rules))
        .unwrap();

    let decision = binding.validate(None, RunOptions::default()).await;
    assert!(!decision.is_accepted());

    let decision = binding
        .validate(Some(attrs(json!({"country": "FR"}))), RunOptions::default())
        .await;
    assert!(decision.is_accepted());
    assert!(binding.is_valid_snapshot());
}

#[tokio::test]
async fn every_attribute_runs_exactly_once() {
    let counters: Vec<_> = (0..4)
        .map(|i| CountingValidator::failing(format!("c{i}"), format!("bad {i}")))
        .collect();
    let mut rules = Rules::new();
    for (i, counter) in counters.iter().enumerate() {
        rules = rules.attr(format!("a{i}"), RuleMap::new().func(counter.clone()));
    }
    let binding = validation()
        .attach(entity(json!({"a0": 1, "a1": 2, "a2": 3, "a3": 4}), rules))
        .unwrap();

    let decision = binding.validate(None, RunOptions::default()).await;
    let Decision::Reject(invalid) = decision else {
        panic!("expected reject");
    };
    assert_eq!(invalid.len(), 4);
    assert_eq!(invalid["a2"], "bad 2");
    for counter in &counters {
        assert_eq!(counter.calls(), 1);
    }
}

#[tokio::test]
async fn equal_to_uses_proposed_values() {
    let rules = Rules::new()
        .attr("password", RuleMap::new().required(true))
        .attr("confirm", RuleMap::new().equal_to("password"));
    let binding = validation()
        .attach(entity(json!({"password": "old", "confirm": "older"}), rules))
        .unwrap();

    let decision = binding
        .validate(
            Some(attrs(json!({"password": "a", "confirm": "a"}))),
            RunOptions::default(),
        )
        .await;
    assert_eq!(decision, Decision::Accept);

    let decision = binding
        .validate(Some(attrs(json!({"confirm": "b"}))), RunOptions::default())
        .await;
    let Decision::Reject(invalid) = decision else {
        panic!("expected reject");
    };
    assert_eq!(invalid["confirm"], "Confirm must be the same as Password");
}

#[tokio::test]
async fn validation_is_idempotent() {
    let rules = Rules::new()
        .attr("name", RuleMap::new().required(true))
        .attr("age", RuleMap::new().range(18, 65));
    let binding = validation()
        .attach(entity(json!({"name": "", "age": 70}), rules))
        .unwrap();

    let first = binding.validate(None, RunOptions::default()).await;
    let snapshot_first = binding.is_valid_snapshot();
    let second = binding.validate(None, RunOptions::default()).await;
    assert_eq!(first, second);
    assert_eq!(snapshot_first, binding.is_valid_snapshot());
}

#[tokio::test]
async fn age_below_minimum() {
    let rules = Rules::new().attr("age", RuleMap::new().required(true).min(18));
    let binding = validation()
        .attach(entity(json!({"age": 15}), rules))
        .unwrap();

    let decision = binding.validate(None, RunOptions::default()).await;
    let Decision::Reject(invalid) = decision else {
        panic!("expected reject");
    };
    assert_eq!(invalid.len(), 1);
    assert_eq!(invalid["age"], "Age must be greater than or equal to 18");
    assert!(!binding.is_valid_snapshot());
}

#[tokio::test]
async fn email_pattern() {
    let rules = Rules::new().attr("email", RuleMap::new().pattern("email"));
    let binding = validation().attach(entity(json!({}), rules)).unwrap();

    let verdict = binding.pre_validate("email", "not-an-email").await;
    let message = verdict.message().unwrap();
    assert!(message.contains("email"), "{message}");

    assert_eq!(binding.pre_validate("email", "a@b.com").await, Verdict::Valid);
}

#[tokio::test]
async fn deferred_steps_settle_in_declaration_order() {
    let log = OrderLog::new();
    let rules = Rules::new()
        .attr(
            "first",
            vec![
                RuleMap::new().func(DeferredValidator::new("slow", 5, Outcome::Pass, log.clone())),
                RuleMap::new().func(DeferredValidator::new("next", 1, Outcome::Pass, log.clone())),
            ],
        )
        .attr(
            "second",
            RuleMap::new().func(DeferredValidator::new("quick", 0, Outcome::Pass, log.clone())),
        );
    let binding = validation()
        .attach(entity(json!({"first": 1, "second": 2}), rules))
        .unwrap();

    assert!(binding.validate(None, RunOptions::default()).await.is_accepted());
    assert_eq!(
        log.entries(),
        vec![
            "slow:first:start",
            "slow:first:end",
            "next:first:start",
            "next:first:end",
            "quick:second:start",
            "quick:second:end",
        ]
    );
}

#[tokio::test]
async fn deferred_failure_short_circuits_the_attribute_only() {
    let log = OrderLog::new();
    let skipped = CountingValidator::passing("skipped");
    let rules = Rules::new()
        .attr(
            "first",
            vec![
                RuleMap::new().func(DeferredValidator::new(
                    "slow",
                    3,
                    Outcome::fail("remote said no"),
                    log.clone(),
                )),
                RuleMap::new().func(skipped.clone()),
            ],
        )
        .attr(
            "second",
            RuleMap::new().func(DeferredValidator::new("quick", 0, Outcome::Pass, log.clone())),
        );
    let binding = validation()
        .attach(entity(json!({"first": 1, "second": 2}), rules))
        .unwrap();

    let Decision::Reject(invalid) = binding.validate(None, RunOptions::default()).await else {
        panic!("expected reject");
    };
    assert_eq!(invalid["first"], "remote said no");
    assert_eq!(skipped.calls(), 0);
    assert!(log.entries().contains(&"quick:second:end".to_string()));
}

#[tokio::test]
async fn faults_become_failures_with_the_configured_message() {
    let after = CountingValidator::passing("after");
    let rules = Rules::new()
        .attr(
            "a",
            vec![
                RuleMap::new()
                    .func(FaultyValidator::new("boom"))
                    .message("{0} could not be checked"),
                RuleMap::new().func(after.clone()),
            ],
        )
        .attr("b", RuleMap::new().func(FaultyValidator::new("boom")));
    let binding = validation()
        .attach(entity(json!({"a": 1, "b": 2}), rules))
        .unwrap();

    let Decision::Reject(invalid) = binding.validate(None, RunOptions::default()).await else {
        panic!("expected reject");
    };
    assert_eq!(invalid["a"], "A could not be checked");
    assert_eq!(invalid["b"], "B is invalid");
    assert_eq!(after.calls(), 0);
}

#[tokio::test]
async fn shared_binding_across_tasks() {
    let rules = Rules::new().attr("age", RuleMap::new().min(18));
    let binding = Arc::new(
        validation()
            .attach(entity(json!({"age": 20}), rules))
            .unwrap(),
    );

    let task = {
        let binding = Arc::clone(&binding);
        tokio::spawn(async move { binding.pre_validate("age", 5).await })
    };
    let verdict = task.await.unwrap();
    assert!(!verdict.is_valid());
}

#[tokio::test]
async fn equal_to_reads_nested_rule_paths() {
    let rules = Rules::new()
        .attr("address.zip", RuleMap::new().required(true))
        .attr("confirmZip", RuleMap::new().equal_to("address.zip"));
    let binding = validation()
        .attach(entity(
            json!({"address": {"zip": "1234"}, "confirmZip": "1234"}),
            rules,
        ))
        .unwrap();

    assert_eq!(binding.validate(None, RunOptions::default()).await, Decision::Accept);

    let decision = binding
        .validate(Some(attrs(json!({"confirmZip": "9999"}))), RunOptions::default())
        .await;
    let Decision::Reject(invalid) = decision else {
        panic!("expected reject");
    };
    assert_eq!(invalid["confirmZip"], "Confirm zip must be the same as Address. zip");
}

#[tokio::test]
async fn validate_and_pre_validate_agree_on_nested_data() {
    let rules = Rules::new()
        .attr("address.zip", RuleMap::new().required(true))
        .attr(
            "address.state",
            RuleMap::new().required_if(|_, _, computed| {
                computed.get("address.country") == Some(&Value::from("US"))
            }),
        )
        .attr("confirmZip", RuleMap::new().equal_to("address.zip"));

    for (data, expect_valid) in [
        (json!({"address": {"zip": "1234", "country": "US", "state": "OR"}, "confirmZip": "1234"}), true),
        (json!({"address": {"zip": "1234", "country": "US", "state": ""}, "confirmZip": "1234"}), false),
        (json!({"address": {"zip": "1234", "country": "FR", "state": ""}, "confirmZip": "1234"}), true),
        (json!({"address": {"zip": "1234", "country": "FR"}, "confirmZip": "4321"}), false),
    ] {
        let model = entity(data, rules.clone());
        let binding = validation().attach(model.clone()).unwrap();

        let mut pre_valid = true;
        for path in ["address.zip", "address.state", "confirmZip"] {
            let value = attest_kernel::flatten::lookup(&model.attributes(), path)
                .cloned()
                .unwrap_or(Value::Null);
            pre_valid &= binding.pre_validate(path, value).await.is_valid();
        }
        let decision = binding.validate(None, RunOptions::default()).await;

        assert_eq!(decision.is_accepted(), expect_valid);
        assert_eq!(pre_valid, expect_valid);
        assert_eq!(binding.is_valid(vec!["address.zip", "address.state", "confirmZip"]).await, expect_valid);
    }
}

#[tokio::test]
async fn nested_rule_path_absent_from_its_object_still_runs() {
    let rules = Rules::new().attr("address.zip", RuleMap::new().required(true));
    let binding = validation()
        .attach(entity(json!({"address": {"street": "Main"}}), rules))
        .unwrap();

    let Decision::Reject(invalid) = binding.validate(None, RunOptions::default()).await else {
        panic!("expected reject");
    };
    assert_eq!(invalid.len(), 1);
    assert_eq!(invalid["address.zip"], "Address. zip is required");
}
