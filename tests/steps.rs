use std::{cell::Cell, rc::Rc};

use cucumber_registry::{
    id, DataTable, FinalizeError, HookOptions, ParameterType, RegistrationError,
    Registry, RunHookOptions, StepArgument, StepError,
};
use futures::FutureExt as _;
use regex::Regex;

#[derive(Debug, Default)]
struct World {
    cukes: i64,
    color: String,
    unit: &'static str,
    table: Option<DataTable>,
}

#[tokio::test]
async fn int_placeholder_binds_integer() {
    let mut registry = Registry::<World>::new();
    registry
        .define_step("I have {int} cukes", |w, mut args| {
            async move {
                w.cukes = args.take::<i64>(0)?;
                Ok(())
            }
            .boxed_local()
        })
        .unwrap();
    registry.finalize(id::incrementing()).unwrap();

    let mut world = World::default();
    registry
        .run_step_definition(&mut world, "I have 42 cukes", false, None)
        .unwrap()
        .await
        .unwrap();

    assert_eq!(world.cukes, 42);
}

#[tokio::test]
async fn regex_group_binds_by_parameter_type() {
    let mut registry = Registry::<World>::new();
    registry
        .define_step(Regex::new(r"^I have (\d+) cukes$").unwrap(), |w, mut args| {
            async move {
                w.cukes = args.take::<i64>(0)?;
                Ok(())
            }
            .boxed_local()
        })
        .unwrap();
    registry.finalize(id::incrementing()).unwrap();

    let mut world = World::default();
    registry
        .run_step_definition(&mut world, "I have 42 cukes", false, None)
        .unwrap()
        .await
        .unwrap();

    assert_eq!(world.cukes, 42);
}

#[test]
fn expression_and_regex_for_same_text_are_ambiguous() {
    let mut registry = Registry::<World>::new();
    registry
        .define_step("I have {int} cukes", |_, _| async { Ok(()) }.boxed_local())
        .unwrap();
    registry
        .define_step(Regex::new(r"I have (\d+) cukes").unwrap(), |_, _| {
            async { Ok(()) }.boxed_local()
        })
        .unwrap();
    registry.finalize(id::incrementing()).unwrap();

    let err = registry.resolve_step_definition("I have 42 cukes").unwrap_err();

    let StepError::Multiple(err) = err else {
        panic!("expected ambiguous step definitions");
    };
    assert_eq!(
        err.patterns().collect::<Vec<_>>(),
        ["I have {int} cukes", r"/I have (\d+) cukes/"],
    );
    let message = err.to_string();
    assert!(message.contains("I have {int} cukes - "), "{message}");
    assert!(message.contains("tests/steps.rs"), "{message}");
}

#[test]
fn unmatched_text_is_missing() {
    let mut registry = Registry::<World>::new();
    registry
        .define_step("I have {int} cukes", |_, _| async { Ok(()) }.boxed_local())
        .unwrap();
    registry.finalize(id::incrementing()).unwrap();

    let err = registry.resolve_step_definition("I have no cukes").unwrap_err();

    assert!(err.is_missing());
    assert_eq!(err.to_string(), "Step implementation missing for: I have no cukes");
    assert!(registry.matching_step_definitions("I have no cukes").is_empty());
}

#[test]
fn dry_run_skips_invocation() {
    let calls = Rc::new(Cell::new(0));
    let mut registry = Registry::<World>::new();
    let counter = Rc::clone(&calls);
    registry
        .define_step("I have {int} cukes", move |_, _| {
            counter.set(counter.get() + 1);
            async { Ok(()) }.boxed_local()
        })
        .unwrap();
    registry.finalize(id::incrementing()).unwrap();
    let mut world = World::default();

    let step = registry
        .run_step_definition(&mut world, "I have 42 cukes", true, None)
        .unwrap();
    futures::executor::block_on(step).unwrap();

    assert_eq!(calls.get(), 0);
    assert!(registry
        .run_step_definition(&mut world, "I have many cukes", true, None)
        .is_err_and(|e| e.is_missing()));
    assert_eq!(calls.get(), 0);
}

#[test]
fn dry_run_still_binds_arguments() {
    let mut registry = Registry::<World>::new();
    registry
        .define_parameter_type(ParameterType::new("picky", r"\w+", |_: &World, s: &str| {
            if s == "ok" {
                Ok(s.to_owned())
            } else {
                Err(anyhow::anyhow!("`{s}` is not ok"))
            }
        }))
        .unwrap();
    registry
        .define_step("it is {picky}", |_, _| async { Ok(()) }.boxed_local())
        .unwrap();
    registry.finalize(id::incrementing()).unwrap();
    let mut world = World::default();

    assert!(registry
        .run_step_definition(&mut world, "it is ok", true, None)
        .is_ok());
    let Err(StepError::Argument { index, text, .. }) =
        registry.run_step_definition(&mut world, "it is bad", true, None)
    else {
        panic!("expected transformer failure");
    };
    assert_eq!((index, text.as_str()), (0, "bad"));
}

#[tokio::test]
async fn custom_parameter_type_reads_world() {
    let mut registry = Registry::<World>::new();
    registry
        .define_step("the cuke is {color} {int}", |w, mut args| {
            async move {
                w.color = args.take(0)?;
                w.cukes = args.take(1)?;
                Ok(())
            }
            .boxed_local()
        })
        .unwrap();
    // Declared after the step using it.
    registry
        .define_parameter_type(ParameterType::new(
            "color",
            "red|green",
            |w: &World, s: &str| Ok::<_, anyhow::Error>(format!("{s} ({})", w.unit)),
        ))
        .unwrap();
    registry.finalize(id::incrementing()).unwrap();
    let mut world = World {
        unit: "pcs",
        ..World::default()
    };

    registry
        .run_step_definition(&mut world, "the cuke is green 3", false, None)
        .unwrap()
        .await
        .unwrap();

    assert_eq!(world.color, "green (pcs)");
    assert_eq!(world.cukes, 3);
}

#[test]
fn undefined_parameter_type_fails_finalize() {
    let mut registry = Registry::<World>::new();
    registry
        .define_step("I pick {flavor}", |_, _| async { Ok(()) }.boxed_local())
        .unwrap();

    let err = registry.finalize(id::incrementing()).unwrap_err();

    assert!(matches!(err, FinalizeError::Expression(_)));
    assert!(err.to_string().contains("`{flavor}`"), "{err}");
}

#[test]
fn malformed_expression_fails_declaration() {
    let mut registry = Registry::<World>::new();

    let res = registry.define_step("I have {int cukes", |_, _| async { Ok(()) }.boxed_local());

    assert!(matches!(res, Err(RegistrationError::InvalidExpression { .. })));
}

#[tokio::test]
async fn trailing_argument_comes_last() {
    let mut registry = Registry::<World>::new();
    registry
        .define_step("the following {int} cukes:", |w, mut args| {
            async move {
                w.cukes = args.take(0)?;
                w.table = args
                    .step_argument()
                    .and_then(StepArgument::as_data_table)
                    .cloned();
                assert_eq!(args.len(), 2);
                Ok(())
            }
            .boxed_local()
        })
        .unwrap();
    registry.finalize(id::incrementing()).unwrap();
    let mut world = World::default();
    let table = DataTable::from(vec![vec!["color"], vec!["green"]]);

    registry
        .run_step_definition(
            &mut world,
            "the following 1 cukes:",
            false,
            Some(table.clone().into()),
        )
        .unwrap()
        .await
        .unwrap();

    assert_eq!(world.cukes, 1);
    assert_eq!(world.table, Some(table));
}

#[tokio::test]
async fn implementation_failure_is_propagated() {
    let mut registry = Registry::<World>::new();
    registry
        .define_step("it breaks", |_, _| {
            async { Err(anyhow::anyhow!("broken on purpose")) }.boxed_local()
        })
        .unwrap();
    registry.finalize(id::incrementing()).unwrap();
    let mut world = World::default();

    let err = registry
        .run_step_definition(&mut world, "it breaks", false, None)
        .unwrap()
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "broken on purpose");
}

#[test]
fn declarations_after_finalize_are_rejected() {
    let mut registry = Registry::<World>::new();
    registry.finalize(id::incrementing()).unwrap();

    assert!(matches!(
        registry.define_step("late", |_, _| async { Ok(()) }.boxed_local()),
        Err(RegistrationError::Finalized { .. }),
    ));
    assert!(matches!(
        registry.define_parameter_type(ParameterType::parsed::<u8>("byte", r"\d+")),
        Err(RegistrationError::Finalized { .. }),
    ));
    assert!(matches!(
        registry.define_before_all(RunHookOptions::default(), |_| {
            async { Ok(()) }.boxed_local()
        }),
        Err(RegistrationError::Finalized { .. }),
    ));
    assert!(registry.step_definitions().is_empty());
}

#[test]
fn ids_are_unique() {
    let mut registry = Registry::<World>::new();
    for text in ["one", "two", "three"] {
        registry
            .define_step(text, |_, _| async { Ok(()) }.boxed_local())
            .unwrap();
    }
    registry
        .define_before(HookOptions::default(), |_, _| async { Ok(()) }.boxed_local())
        .unwrap();
    registry.finalize(id::incrementing()).unwrap();

    let mut ids = registry
        .step_definitions()
        .iter()
        .map(|d| d.id().clone())
        .chain(registry.case_hooks().iter().map(|h| h.id().clone()))
        .collect::<Vec<_>>();
    ids.sort();
    ids.dedup();

    assert_eq!(ids.len(), 4);
}

#[test]
fn duplicate_ids_fail_finalize() {
    let mut registry = Registry::<World>::new();
    registry
        .define_step("one", |_, _| async { Ok(()) }.boxed_local())
        .unwrap();
    registry
        .define_step("two", |_, _| async { Ok(()) }.boxed_local())
        .unwrap();

    let err = registry.finalize(|| "same".into()).unwrap_err();

    assert!(matches!(err, FinalizeError::DuplicateId { id } if id.as_str() == "same"));
    assert!(!registry.is_finalized());
}

#[tokio::test]
async fn step_keywords_share_one_namespace() {
    let mut registry = Registry::<World>::new();
    registry
        .define_given("I have {int} cukes", |w, mut args| {
            async move {
                w.cukes = args.take(0)?;
                Ok(())
            }
            .boxed_local()
        })
        .unwrap();
    registry
        .define_then("I eat {int} cukes", |w, mut args| {
            async move {
                w.cukes -= args.take::<i64>(0)?;
                Ok(())
            }
            .boxed_local()
        })
        .unwrap();
    registry
        .define_when("I eat {int} cukes", |_, _| async { Ok(()) }.boxed_local())
        .unwrap();
    registry.finalize(id::incrementing()).unwrap();
    let mut world = World::default();

    registry
        .run_step_definition(&mut world, "I have 5 cukes", false, None)
        .unwrap()
        .await
        .unwrap();

    assert_eq!(world.cukes, 5);
    assert!(matches!(
        registry.resolve_step_definition("I eat 2 cukes"),
        Err(StepError::Multiple(_)),
    ));
}
