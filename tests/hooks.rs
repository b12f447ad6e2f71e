use cucumber_registry::{
    gherkin, id, CaseHookParameter, HookOptions, RegistrationError, Registry,
    RunHookOptions, Source, StepHookParameter, DEFAULT_HOOK_ORDER,
};
use futures::FutureExt as _;

#[derive(Debug, Default)]
struct World {
    log: Vec<String>,
}

const FEATURE: &str = "\
@billing
Feature: Billing

  @smoke
  Scenario: Pay
    Given a bill
";

fn scenario() -> CaseHookParameter {
    let feature =
        gherkin::Feature::parse(FEATURE, gherkin::GherkinEnv::default()).unwrap();
    let scenario = feature.scenarios[0].clone();
    CaseHookParameter {
        feature: Source::new(feature),
        rule: None,
        scenario: Source::new(scenario),
        test_case_started_id: "case-1".into(),
    }
}

/// Declares a `Before` and an `After` hook logging `name` with each `order`.
fn with_case_hooks(registry: &mut Registry<World>, hooks: &[(&'static str, i32)]) {
    for &(name, order) in hooks {
        registry
            .define_before(HookOptions::default().order(order).name(name), move |w, _| {
                w.log.push(format!("before {name}"));
                async { Ok(()) }.boxed_local()
            })
            .unwrap();
        registry
            .define_after(HookOptions::default().order(order).name(name), move |w, _| {
                w.log.push(format!("after {name}"));
                async { Ok(()) }.boxed_local()
            })
            .unwrap();
    }
}

fn names<'h>(hooks: impl IntoIterator<Item = Option<&'h str>>) -> Vec<&'h str> {
    hooks.into_iter().map(Option::unwrap_or_default).collect()
}

#[test]
fn before_hooks_ascend_and_after_hooks_descend() {
    let mut registry = Registry::new();
    with_case_hooks(&mut registry, &[("ten", 10), ("five", 5)]);
    registry.finalize(id::incrementing()).unwrap();

    let before = registry.resolve_before_hooks(["@smoke"]);
    let after = registry.resolve_after_hooks(["@smoke"]);

    assert_eq!(names(before.iter().map(|h| h.name())), ["five", "ten"]);
    assert_eq!(
        before.iter().map(|h| h.order()).collect::<Vec<_>>(),
        [5, 10],
    );
    assert_eq!(names(after.iter().map(|h| h.name())), ["ten", "five"]);
}

#[test]
fn ties_keep_registration_order_and_unwind_reversed() {
    let mut registry = Registry::new();
    with_case_hooks(&mut registry, &[("a", 1), ("b", 1), ("c", 1)]);
    registry.finalize(id::incrementing()).unwrap();

    let before = registry.resolve_before_hooks(Vec::<String>::new());
    let after = registry.resolve_after_hooks(Vec::<String>::new());

    assert_eq!(names(before.iter().map(|h| h.name())), ["a", "b", "c"]);
    assert_eq!(names(after.iter().map(|h| h.name())), ["c", "b", "a"]);
}

#[test]
fn default_order_is_applied() {
    let mut registry = Registry::<World>::new();
    registry
        .define_before(HookOptions::default(), |_, _| async { Ok(()) }.boxed_local())
        .unwrap();
    registry.finalize(id::incrementing()).unwrap();

    assert_eq!(registry.case_hooks()[0].order(), DEFAULT_HOOK_ORDER);
    assert_eq!(DEFAULT_HOOK_ORDER, 10_000);
}

#[test]
fn tagged_hooks_apply_to_matching_scenarios_only() {
    let mut registry = Registry::<World>::new();
    registry
        .define_before("@smoke", |_, _| async { Ok(()) }.boxed_local())
        .unwrap();
    registry
        .define_before(HookOptions::default(), |_, _| async { Ok(()) }.boxed_local())
        .unwrap();
    registry
        .define_before_step("@smoke and not @slow", |_, _| {
            async { Ok(()) }.boxed_local()
        })
        .unwrap();
    registry.finalize(id::incrementing()).unwrap();

    assert_eq!(registry.resolve_before_hooks(["@smoke"]).len(), 2);
    assert_eq!(registry.resolve_before_hooks(["@regression"]).len(), 1);
    assert_eq!(registry.resolve_before_step_hooks(["@smoke"]).len(), 1);
    assert!(registry
        .resolve_before_step_hooks(["@smoke", "@slow"])
        .is_empty());
}

#[test]
fn malformed_tag_expression_fails_declaration() {
    let mut registry = Registry::<World>::new();

    let res = registry.define_after("@a and", |_, _| async { Ok(()) }.boxed_local());

    assert!(matches!(res, Err(RegistrationError::InvalidTagExpression(_))));
}

#[test]
fn resolution_is_pure() {
    let mut registry = Registry::new();
    with_case_hooks(&mut registry, &[("x", 2), ("y", 1)]);
    registry.finalize(id::incrementing()).unwrap();

    let first = registry.resolve_after_hooks(["@any"]);
    let second = registry.resolve_after_hooks(["@any"]);

    assert_eq!(names(first.iter().map(|h| h.name())), names(second.iter().map(|h| h.name())));
    assert_eq!(names(registry.case_hooks().iter().map(|h| h.name())), ["x", "x", "y", "y"]);
}

#[test]
fn run_hooks_are_ordered_and_not_filtered() {
    let mut registry = Registry::<World>::new();
    for order in [3, 1, 2] {
        registry
            .define_before_all(RunHookOptions::from(order), |_| async { Ok(()) }.boxed_local())
            .unwrap();
        registry
            .define_after_all(order, |_| async { Ok(()) }.boxed_local())
            .unwrap();
    }
    registry.finalize(id::incrementing()).unwrap();

    let before = registry.resolve_before_all_hooks();
    let after = registry.resolve_after_all_hooks();

    assert_eq!(before.iter().map(|h| h.order()).collect::<Vec<_>>(), [1, 2, 3]);
    assert_eq!(after.iter().map(|h| h.order()).collect::<Vec<_>>(), [3, 2, 1]);
}

#[tokio::test]
async fn hooks_run_in_resolved_order() {
    let mut registry = Registry::new();
    with_case_hooks(&mut registry, &[("late", 20), ("early", 10)]);
    registry
        .define_before_all(RunHookOptions::default(), |w| {
            w.log.push("before all".into());
            async { Ok(()) }.boxed_local()
        })
        .unwrap();
    registry.finalize(id::incrementing()).unwrap();
    let mut world = World::default();
    let param = scenario();
    let tags = param.tags();

    for hook in registry.resolve_before_all_hooks() {
        registry.run_run_hook(&mut world, hook).await.unwrap();
    }
    for hook in registry.resolve_before_hooks(tags.iter()) {
        registry.run_case_hook(&mut world, hook, param.clone()).await.unwrap();
    }
    for hook in registry.resolve_after_hooks(tags.iter()) {
        registry.run_case_hook(&mut world, hook, param.clone()).await.unwrap();
    }

    assert_eq!(
        world.log,
        [
            "before all",
            "before early",
            "before late",
            "after late",
            "after early",
        ],
    );
}

#[tokio::test]
async fn step_hook_receives_step_and_scenario() {
    let mut registry = Registry::<World>::new();
    registry
        .define_after_step(HookOptions::default(), |w, p: StepHookParameter| {
            w.log.push(format!(
                "{} / {} / {}",
                p.scenario.name, p.step.value, p.test_step_id,
            ));
            async { Ok(()) }.boxed_local()
        })
        .unwrap();
    registry.finalize(id::incrementing()).unwrap();
    let case = scenario();
    let step = case.scenario.steps[0].clone();
    let mut world = World::default();

    for hook in registry.resolve_after_step_hooks(case.tags()) {
        let param = StepHookParameter {
            case: case.clone(),
            step: Source::new(step.clone()),
            test_step_id: "step-1".into(),
        };
        registry.run_step_hook(&mut world, hook, param).await.unwrap();
    }

    assert_eq!(world.log, ["Pay / a bill / step-1"]);
}

#[test]
fn positions_point_to_declarations() {
    let mut registry = Registry::<World>::new();
    registry
        .define_before_all(RunHookOptions::default(), |_| async { Ok(()) }.boxed_local())
        .unwrap();

    let position = registry.run_hooks()[0].position().unwrap();

    assert_eq!(position.path, file!());
}
