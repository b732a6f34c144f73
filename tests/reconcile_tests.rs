use chart_join::ChartError;
use chart_join::core::Key;
use chart_join::join::{
    Attr, Attributes, Encoding, JoinTiming, MarkKind, RenderedElement, Scene, reconcile,
};

#[derive(Debug, Clone, PartialEq)]
struct Row {
    code: &'static str,
    value: f64,
}

fn row(code: &'static str, value: f64) -> Row {
    Row { code, value }
}

struct WidthEncoding;

impl Encoding<Row> for WidthEncoding {
    fn key(&self, row: &Row) -> Key {
        Key::from(row.code)
    }

    fn enter(&self, _row: &Row) -> Attributes {
        Attributes::new().with(Attr::Width, 0.0)
    }

    fn update(&self, row: &Row) -> Attributes {
        Attributes::new().with(Attr::Width, row.value)
    }

    fn exit(&self, _element: &RenderedElement) -> Attributes {
        Attributes::new().with(Attr::Width, 0.0)
    }
}

fn keys(codes: &[&str]) -> Vec<Key> {
    codes.iter().copied().map(Key::from).collect()
}

#[test]
fn partition_splits_enter_update_and_exit() {
    let previous = keys(&["USA", "MEX", "DEU"]);
    let data = vec![row("DEU", 82.0), row("GBR", 85.0), row("USA", 71.7)];

    let partition = reconcile(&previous, &data, |r| Key::from(r.code)).expect("unique keys");

    let entered: Vec<&str> = partition.enter.iter().map(|r| r.code).collect();
    let updated: Vec<&str> = partition.update.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(entered, vec!["GBR"]);
    assert_eq!(updated, vec!["DEU", "USA"]);
    assert_eq!(partition.exit, keys(&["MEX"]));
    assert!(!partition.is_unchanged());
}

#[test]
fn first_join_enters_everything() {
    let data = vec![row("USA", 71.7), row("MEX", 31.1)];
    let partition = reconcile(&[], &data, |r| Key::from(r.code)).expect("unique keys");
    assert_eq!(partition.enter.len(), 2);
    assert!(partition.update.is_empty());
    assert!(partition.exit.is_empty());
}

#[test]
fn duplicate_keys_are_rejected_with_both_indices() {
    let data = vec![row("USA", 1.0), row("MEX", 2.0), row("USA", 3.0)];
    let err = reconcile(&[], &data, |r| Key::from(r.code)).expect_err("duplicate key");
    match err {
        ChartError::DuplicateKey {
            key,
            first_index,
            second_index,
        } => {
            assert_eq!(key, "USA");
            assert_eq!(first_index, 0);
            assert_eq!(second_index, 2);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn rejoining_identical_data_keeps_element_identity() {
    let mut scene = Scene::new("bars", MarkKind::Rect);
    let data = vec![row("USA", 71.7), row("MEX", 31.1)];
    let timing = JoinTiming::new(100.0, 100.0);

    scene.join(&data, &WidthEncoding, timing).expect("first join");
    scene.advance(200.0);
    let ids: Vec<_> = scene.elements().map(RenderedElement::id).collect();

    let summary = scene.join(&data, &WidthEncoding, timing).expect("second join");
    scene.advance(200.0);

    assert_eq!(summary.entered, 0);
    assert_eq!(summary.updated, 2);
    assert_eq!(summary.exited, 0);
    let after: Vec<_> = scene.elements().map(RenderedElement::id).collect();
    assert_eq!(ids, after);
    assert_eq!(scene.get("USA").and_then(|e| e.number(Attr::Width)), Some(71.7));
}

#[test]
fn duplicate_key_join_leaves_the_scene_untouched() {
    let mut scene = Scene::new("bars", MarkKind::Rect);
    let timing = JoinTiming::new(0.0, 0.0);
    scene
        .join(&[row("USA", 71.7)], &WidthEncoding, timing)
        .expect("first join");
    scene.advance(1.0);

    let result = scene.join(&[row("MEX", 1.0), row("MEX", 2.0)], &WidthEncoding, timing);
    assert!(result.is_err());
    assert_eq!(scene.len(), 1);
    assert!(scene.get("USA").is_some_and(|e| !e.is_exiting()));
    assert!(!scene.is_animating());
}

#[test]
fn exiting_element_stays_until_its_transition_ends() {
    let mut scene = Scene::new("bars", MarkKind::Rect);
    let timing = JoinTiming::new(100.0, 300.0);
    scene
        .join(&[row("USA", 71.7), row("MEX", 31.1)], &WidthEncoding, timing)
        .expect("first join");
    scene.advance(100.0);

    let summary = scene
        .join(&[row("USA", 71.7)], &WidthEncoding, timing)
        .expect("second join");
    assert_eq!(summary.exited, 1);

    scene.advance(150.0);
    let mex = scene.get("MEX").expect("still rendered mid-exit");
    assert!(mex.is_exiting());
    assert_eq!(scene.live_elements().count(), 1);

    scene.advance(150.0);
    assert!(scene.get("MEX").is_none());
    assert_eq!(scene.len(), 1);
}

#[test]
fn key_returning_mid_exit_is_revived_not_recreated() {
    let mut scene = Scene::new("bars", MarkKind::Rect);
    let timing = JoinTiming::new(100.0, 300.0);
    scene
        .join(&[row("USA", 71.7), row("MEX", 31.1)], &WidthEncoding, timing)
        .expect("first join");
    scene.advance(100.0);
    let mex_id = scene.get("MEX").map(RenderedElement::id).expect("mex");

    scene
        .join(&[row("USA", 71.7)], &WidthEncoding, timing)
        .expect("exit mex");
    scene.advance(100.0);

    let summary = scene
        .join(&[row("USA", 71.7), row("MEX", 40.0)], &WidthEncoding, timing)
        .expect("revive mex");
    assert_eq!(summary.revived, 1);
    assert_eq!(summary.entered, 0);

    scene.advance(500.0);
    let mex = scene.get("MEX").expect("mex survives");
    assert_eq!(mex.id(), mex_id);
    assert!(!mex.is_exiting());
    assert_eq!(mex.number(Attr::Width), Some(40.0));
}
