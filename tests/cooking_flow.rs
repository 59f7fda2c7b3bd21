// Native integration tests for full cooking sessions.
// Time is virtual (ManualScheduler), so tick counts are exact.

use cocina_nui::{
    ControlAction, CookingConfig, CookingError, Ingredient, ManualScheduler, Outbound, Phase, Recipe,
    ResultItem, Session, Task, ValidationError,
};

fn ingredient(name: &str, required: u32, available: u32) -> Ingredient {
    Ingredient { name: name.into(), required, available, image: None }
}

fn stew(ingredients: Vec<Ingredient>) -> Recipe {
    Recipe {
        id: "stew".into(),
        name: "Meat Stew".into(),
        description: "Slow cooked".into(),
        ingredients,
        result: ResultItem { name: "meat_stew".into(), image: None },
        level: None,
        image: None,
    }
}

fn stocked_stew() -> Recipe {
    stew(vec![ingredient("Meat", 1, 2), ingredient("Water", 1, 5)])
}

/// Session with the open guard already released.
fn opened(recipes: Vec<Recipe>) -> Session<ManualScheduler> {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut s = Session::new(CookingConfig::default(), ManualScheduler::new());
    s.open(Some(recipes));
    s.run_for(500);
    s
}

fn cooking(recipe: Recipe) -> Session<ManualScheduler> {
    let mut s = opened(vec![recipe]);
    s.select_recipe("stew").unwrap();
    s.start_cooking().unwrap();
    s
}

/// Ticks until the dish resolves, feeding the fire below `floor`. Returns the tick count.
fn cook_holding_fire(s: &mut Session<ManualScheduler>, floor: f64, max_ticks: u32) -> Option<u32> {
    for tick in 1..=max_ticks {
        if s.state().fire < floor {
            s.control_action(ControlAction::Fire);
        }
        if s.advance().is_some() {
            return Some(tick);
        }
    }
    None
}

#[test]
fn start_sends_start_notification_and_resets_state() {
    let mut s = cooking(stocked_stew());
    assert_eq!(s.phase(), Phase::Cooking);
    assert_eq!(s.snapshot().fire, 30.0);
    assert_eq!(s.snapshot().progress, 0.0);
    assert_eq!(s.snapshot().quality, 100.0);
    assert!(s.scheduler().is_armed(Task::Tick));
    assert_eq!(s.take_outbound(), vec![Outbound::StartCooking { recipe_id: "stew".into() }]);
}

#[test]
fn each_start_precondition_rejects_distinctly() {
    let mut s = opened(vec![stocked_stew()]);
    assert!(matches!(
        s.start_cooking(),
        Err(CookingError::Validation(ValidationError::NothingSelected))
    ));

    s.select_recipe("stew").unwrap();
    s.start_cooking().unwrap();
    s.run_for(1_000);
    assert!(matches!(
        s.start_cooking(),
        Err(CookingError::Validation(ValidationError::AlreadyCooking))
    ));

    let mut short = opened(vec![stew(vec![ingredient("Meat", 1, 2), ingredient("Water", 2, 1)])]);
    short.select_recipe("stew").unwrap();
    let err = short.start_cooking().unwrap_err();
    match err {
        CookingError::Validation(ValidationError::InsufficientIngredients { missing }) => {
            assert_eq!(missing, vec!["Water".to_string()]);
        }
        other => panic!("unexpected {other:?}"),
    }
    assert!(!short.is_cooking());
    assert!(!short.scheduler().is_armed(Task::Tick));
    assert!(short.take_outbound().is_empty());
}

#[test]
fn rejected_start_leaves_guard_untouched() {
    let mut s = opened(vec![stocked_stew()]);
    let _ = s.start_cooking();
    assert!(!s.is_processing());
}

#[test]
fn start_guard_drops_rapid_duplicates() {
    let mut s = cooking(stocked_stew());
    s.reset_cooking();
    s.select_recipe("stew").unwrap();
    assert!(matches!(s.start_cooking(), Err(CookingError::Busy)));
    s.run_for(1_000);
    assert!(s.start_cooking().is_ok());
}

#[test]
fn unattended_pan_stalls_and_cools() {
    let mut s = cooking(stocked_stew());
    s.run_for(500 * 100);
    let snap = s.snapshot();
    // Progress only accrues for the first 50 ticks, while fire is above 20.
    assert_eq!(snap.fire, 0.0);
    assert!((snap.progress - 9.96).abs() < 1e-6, "progress {}", snap.progress);
    // Every later tick is under-heated with progress < 80: 450 x 0.1.
    assert!((snap.quality - 55.0).abs() < 1e-6, "quality {}", snap.quality);
    assert_eq!(snap.phase, Phase::Cooking);
    assert!(s.last_outcome().is_none());
}

#[test]
fn steady_medium_heat_finishes_with_full_quality() {
    let mut s = cooking(stocked_stew());
    s.take_outbound();
    assert_eq!(cook_holding_fire(&mut s, 40.0, 1_000), Some(255));
    assert_eq!(
        s.take_outbound(),
        vec![Outbound::CookingComplete {
            success: true,
            recipe: "Meat Stew".into(),
            result: Some("meat_stew".into()),
            quality: 100,
        }]
    );
    assert_eq!(s.phase(), Phase::Idle);
    assert!(s.selected().is_none());
    assert!(!s.scheduler().is_armed(Task::Tick));
}

#[test]
fn scorching_costs_quality_but_still_succeeds() {
    let mut s = cooking(stocked_stew());
    let mut ticks = 0;
    let outcome = loop {
        ticks += 1;
        s.control_action(ControlAction::Fire);
        if let Some(outcome) = s.advance() {
            break outcome;
        }
    };
    assert_eq!(ticks, 127);
    assert!(outcome.success);
    assert_eq!(outcome.quality, 63);
    assert_eq!(outcome.result.as_deref(), Some("meat_stew"));
}

#[test]
fn neglected_dish_fails_without_result() {
    let mut s = cooking(stocked_stew());
    for _ in 0..800 {
        s.advance();
    }
    assert!((s.state().quality - 25.0).abs() < 1e-6);
    s.take_outbound();
    assert_eq!(cook_holding_fire(&mut s, 40.0, 1_000), Some(224));
    assert_eq!(
        s.take_outbound(),
        vec![Outbound::CookingComplete {
            success: false,
            recipe: "Meat Stew".into(),
            result: None,
            quality: 25,
        }]
    );
    assert_eq!(s.last_outcome().map(|o| o.success), Some(false));
}

#[test]
fn timer_driven_run_matches_manual_ticks() {
    let mut s = cooking(stocked_stew());
    s.take_outbound();
    // Maxed fire every tick, driven through the 100 ms interval instead of advance().
    for _ in 0..126 {
        s.control_action(ControlAction::Fire);
        s.run_for(100);
    }
    assert!(s.is_cooking());
    s.control_action(ControlAction::Fire);
    s.run_for(100);
    assert!(!s.is_cooking());
    assert_eq!(s.last_outcome().map(|o| o.quality), Some(63));
}

#[test]
fn resolved_session_closes_itself() {
    let mut s = cooking(stocked_stew());
    cook_holding_fire(&mut s, 40.0, 1_000).unwrap();
    s.take_outbound();
    assert!(s.is_visible());
    s.run_for(999);
    assert!(s.take_outbound().is_empty());
    s.run_for(1);
    assert_eq!(s.take_outbound(), vec![Outbound::CloseUi]);
    assert!(!s.is_visible());
}

#[test]
fn auto_close_can_be_disabled() {
    let cfg = CookingConfig { auto_close_ms: None, ..Default::default() };
    let mut s = Session::new(cfg, ManualScheduler::new());
    s.open(Some(vec![stocked_stew()]));
    s.run_for(500);
    s.select_recipe("stew").unwrap();
    s.start_cooking().unwrap();
    cook_holding_fire(&mut s, 40.0, 1_000).unwrap();
    s.take_outbound();
    s.run_for(10_000);
    assert!(s.take_outbound().is_empty());
    assert!(s.is_visible());
}

#[test]
fn abort_mid_cook_never_reports_completion() {
    let mut s = cooking(stocked_stew());
    s.run_for(3_000);
    s.take_outbound();
    s.run_for(1_000);
    s.close_interface().unwrap();
    assert_eq!(s.take_outbound(), vec![Outbound::CloseUi]);
    assert_eq!(s.phase(), Phase::Idle);
    assert!(!s.scheduler().is_armed(Task::Tick));
    s.run_for(60_000);
    assert!(s.take_outbound().is_empty());
}

#[test]
fn close_is_dropped_while_guard_is_set() {
    let mut s = cooking(stocked_stew());
    s.take_outbound();
    assert!(matches!(s.close_interface(), Err(CookingError::Busy)));
    assert!(s.is_cooking());
    assert!(s.take_outbound().is_empty());
    s.run_for(1_000);
    s.close_interface().unwrap();
    assert!(matches!(s.close_interface(), Err(CookingError::Busy)));
    s.run_for(200);
    assert!(s.close_interface().is_ok());
}

#[test]
fn reset_is_silent() {
    let mut s = cooking(stocked_stew());
    s.take_outbound();
    s.run_for(2_000);
    s.reset_cooking();
    assert!(s.take_outbound().is_empty());
    assert_eq!(s.snapshot().quality, 100.0);
    assert_eq!(s.snapshot().fire, 0.0);
}

#[test]
fn controls_are_clamped_during_a_run() {
    let mut s = cooking(stocked_stew());
    for _ in 0..10 {
        s.control_action(ControlAction::Fire);
        s.control_action(ControlAction::Seasoning);
    }
    assert_eq!(s.state().fire, 100.0);
    assert_eq!(s.state().quality, 100.0);
    for _ in 0..20 {
        s.control_action(ControlAction::Water);
    }
    assert_eq!(s.state().fire, 0.0);
}

#[test]
fn host_inventory_is_never_mutated() {
    let mut s = cooking(stocked_stew());
    cook_holding_fire(&mut s, 40.0, 1_000).unwrap();
    assert_eq!(s.recipes()[0], stocked_stew());
}
