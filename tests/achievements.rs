//! Integration tests for achievement unlocks through the grant path.

use chrono::{DateTime, TimeZone, Utc};
use questline::{
    AchievementDef, AchievementSet, LessonId, PredicateError, ProgramId, Questline, Tuning,
    XpEvent,
};

fn lesson(n: u32) -> XpEvent {
    XpEvent::LessonCompleted {
        program_id: ProgramId::new("rust-101"),
        lesson_id: LessonId::new(format!("lesson-{}", n)),
        module_index: 0,
        duration_secs: 0,
    }
}

fn at_noon(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, day, 12, 0, 0).unwrap()
}

#[test]
fn first_lesson_unlocks_builtin_achievement() {
    let engine = Questline::with_defaults();
    let mut profile = engine.new_profile("user-1");

    let outcome = engine
        .add_experience_at(&mut profile, &lesson(1), at_noon(2))
        .unwrap();

    let ids: Vec<&str> = outcome
        .achievements_unlocked
        .iter()
        .map(|a| a.achievement_id.as_str())
        .collect();
    assert_eq!(ids, vec!["first-lesson"]);
    // The flat reward landed on top of the grant
    assert_eq!(
        outcome.level.experience_total,
        u64::from(outcome.total_gain) + 50
    );
}

#[test]
fn achievement_unlocks_exactly_once_across_repeated_grants() {
    let engine = Questline::with_defaults();
    let mut profile = engine.new_profile("user-1");

    let first = engine
        .add_experience_at(&mut profile, &lesson(1), at_noon(2))
        .unwrap();
    assert_eq!(first.achievements_unlocked.len(), 1);

    for day in 3..8 {
        let outcome = engine
            .add_experience_at(&mut profile, &lesson(day), at_noon(day))
            .unwrap();
        assert!(outcome
            .achievements_unlocked
            .iter()
            .all(|a| a.achievement_id.as_str() != "first-lesson"));
    }
    assert_eq!(
        profile
            .achievements
            .iter()
            .filter(|a| a.achievement_id.as_str() == "first-lesson")
            .count(),
        1
    );
}

#[test]
fn streak_milestone_unlocks_on_the_third_day() {
    let engine = Questline::with_defaults();
    let mut profile = engine.new_profile("user-1");

    engine
        .add_experience_at(&mut profile, &lesson(1), at_noon(2))
        .unwrap();
    engine
        .add_experience_at(&mut profile, &lesson(2), at_noon(3))
        .unwrap();
    let third_day = engine
        .add_experience_at(&mut profile, &lesson(3), at_noon(4))
        .unwrap();

    assert!(third_day
        .achievements_unlocked
        .iter()
        .any(|a| a.achievement_id.as_str() == "streak-3"));
}

#[test]
fn unlock_rewards_cascade_into_further_unlocks() {
    // "starter" rewards enough XP to cross the second achievement's
    // threshold within the same grant: the fixed point runs both.
    let set = AchievementSet::new(vec![
        AchievementDef::new("starter", 2000, |p| Ok(p.level.experience_total >= 100)),
        AchievementDef::new("over-2000", 0, |p| Ok(p.level.experience_total >= 2000)),
    ])
    .unwrap();
    let engine = Questline::new(Tuning::default(), set).unwrap();
    let mut profile = engine.new_profile("user-1");

    let outcome = engine
        .add_experience_at(&mut profile, &lesson(1), at_noon(2))
        .unwrap();

    let ids: Vec<&str> = outcome
        .achievements_unlocked
        .iter()
        .map(|a| a.achievement_id.as_str())
        .collect();
    assert_eq!(ids, vec!["starter", "over-2000"]);
    // 100 base + 25 streak + 2000 reward, and the level caught up in-call
    // (2125 total crosses the 1000, 1500, and 2000 thresholds)
    assert_eq!(outcome.level.experience_total, 2125);
    assert_eq!(outcome.level.current_level, 4);
}

#[test]
fn failing_predicate_does_not_block_the_grant_or_siblings() {
    let set = AchievementSet::new(vec![
        AchievementDef::new("broken", 10, |_| {
            Err(PredicateError::new("catalog lookup failed"))
        }),
        AchievementDef::new("first-grant", 30, |p| Ok(!p.granted.is_empty())),
    ])
    .unwrap();
    let engine = Questline::new(Tuning::default(), set).unwrap();
    let mut profile = engine.new_profile("user-1");

    let outcome = engine
        .add_experience_at(&mut profile, &lesson(1), at_noon(2))
        .unwrap();

    assert!(outcome.gained > 0);
    let ids: Vec<&str> = outcome
        .achievements_unlocked
        .iter()
        .map(|a| a.achievement_id.as_str())
        .collect();
    assert_eq!(ids, vec!["first-grant"]);
}

#[test]
fn unlock_records_snapshot_the_reward() {
    let set = AchievementSet::new(vec![AchievementDef::new("starter", 123, |p| {
        Ok(!p.granted.is_empty())
    })])
    .unwrap();
    let engine = Questline::new(Tuning::default(), set).unwrap();
    let mut profile = engine.new_profile("user-1");

    let outcome = engine
        .add_experience_at(&mut profile, &lesson(1), at_noon(2))
        .unwrap();
    assert_eq!(outcome.achievements_unlocked[0].xp_reward, 123);
    assert_eq!(profile.achievements[0].xp_reward, 123);

    // Each unlock also leaves an audit entry
    assert!(profile
        .ledger
        .iter()
        .any(|e| e.kind.as_str() == "ACHIEVEMENT_UNLOCKED" && e.xp == 123));
}
