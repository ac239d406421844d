use super::*;
use crate::dom::Viewport;
use crate::testing::{FakePage, region};

fn snapshot(regions: Vec<EditableRegion>) -> PageSnapshot {
    PageSnapshot {
        viewport: Viewport { width: 1280.0, height: 800.0 },
        regions,
    }
}

#[test]
fn test_no_candidates_yields_none() {
    assert_eq!(select_composer(&snapshot(vec![])), None);
}

#[test]
fn test_single_plausible_candidate_wins() {
    // Lone plausible candidate wins even with no accessibility hints.
    let s = snapshot(vec![region(1, 100.0, 700.0, 600.0, 40.0)]);
    assert_eq!(select_composer(&s), Some(RegionId(1)));
}

#[test]
fn test_too_narrow_is_filtered() {
    let s = snapshot(vec![region(1, 100.0, 700.0, 200.0, 40.0)]);
    assert_eq!(select_composer(&s), None);
}

#[test]
fn test_too_short_is_filtered() {
    let s = snapshot(vec![region(1, 100.0, 700.0, 600.0, 20.0)]);
    assert_eq!(select_composer(&s), None);
}

#[test]
fn test_hidden_is_filtered_despite_textbox_role() {
    // The visibility/size/position filter is not overridden by attributes.
    let s = snapshot(vec![
        region(1, 100.0, 700.0, 600.0, 40.0).with_role("textbox").hidden(),
    ]);
    assert_eq!(select_composer(&s), None);
}

#[test]
fn test_upper_half_is_filtered() {
    // bottom = 340, viewport midline = 400.
    let s = snapshot(vec![region(1, 100.0, 300.0, 600.0, 40.0)]);
    assert_eq!(select_composer(&s), None);
}

#[test]
fn test_bottom_just_past_midline_is_plausible() {
    let s = snapshot(vec![region(1, 100.0, 380.0, 600.0, 40.0)]);
    assert_eq!(select_composer(&s), Some(RegionId(1)));
}

#[test]
fn test_textbox_role_breaks_tie() {
    let s = snapshot(vec![
        region(1, 100.0, 600.0, 600.0, 40.0),
        region(2, 100.0, 700.0, 600.0, 40.0).with_role("textbox"),
    ]);
    assert_eq!(select_composer(&s), Some(RegionId(2)));
}

#[test]
fn test_label_hint_breaks_tie_case_insensitively() {
    let s = snapshot(vec![
        region(1, 100.0, 600.0, 600.0, 40.0),
        region(2, 100.0, 700.0, 600.0, 40.0).with_aria_label("TYPE A MESSAGE to +123"),
    ]);
    assert_eq!(select_composer(&s), Some(RegionId(2)));
}

#[test]
fn test_two_textbox_roles_fall_through_to_position() {
    // Both carry the role, so the accessibility pass stays ambiguous; the
    // lower one sits 100px below the other and wins positionally.
    let s = snapshot(vec![
        region(1, 100.0, 600.0, 600.0, 40.0).with_role("textbox"),
        region(2, 100.0, 700.0, 600.0, 40.0).with_role("textbox"),
    ]);
    assert_eq!(select_composer(&s), Some(RegionId(2)));
}

#[test]
fn test_lowest_needs_clear_margin() {
    // Bottoms 740 and 700: only 40px apart, below the 50px clearance.
    let s = snapshot(vec![
        region(1, 100.0, 660.0, 600.0, 40.0),
        region(2, 100.0, 700.0, 600.0, 40.0),
    ]);
    assert_eq!(select_composer(&s), None);
}

#[test]
fn test_lowest_with_margin_wins() {
    // Bottoms 760 and 700: 60px apart.
    let s = snapshot(vec![
        region(1, 100.0, 660.0, 600.0, 40.0),
        region(2, 100.0, 720.0, 600.0, 40.0),
    ]);
    assert_eq!(select_composer(&s), Some(RegionId(2)));
}

#[test]
fn test_irrelevant_label_stays_ambiguous() {
    let s = snapshot(vec![
        region(1, 100.0, 700.0, 600.0, 40.0).with_aria_label("Search"),
        region(2, 100.0, 700.0, 600.0, 40.0).with_aria_label("Notes"),
    ]);
    assert_eq!(select_composer(&s), None);
}

mod watch {
    use super::*;
    use std::sync::Arc;
    use tokio::sync::mpsc;

    async fn drain_one(
        rx: &mut mpsc::UnboundedReceiver<Option<ComposerHandle>>,
    ) -> Option<ComposerHandle> {
        tokio::time::timeout(std::time::Duration::from_secs(1), rx.recv())
            .await
            .expect("watch did not report in time")
            .expect("watch channel closed")
    }

    #[tokio::test]
    async fn test_initial_locate_reports_immediately() {
        let page = Arc::new(FakePage::new());
        page.add_region(region(1, 100.0, 700.0, 600.0, 40.0), "");
        let (tx, mut rx) = mpsc::unbounded_channel();

        let _watch = ComposerWatch::spawn(page.clone(), tx);
        assert_eq!(drain_one(&mut rx).await, Some(ComposerHandle::new(RegionId(1))));
    }

    #[tokio::test]
    async fn test_initial_locate_reports_absence() {
        let page = Arc::new(FakePage::new());
        let (tx, mut rx) = mpsc::unbounded_channel();

        let _watch = ComposerWatch::spawn(page.clone(), tx);
        assert_eq!(drain_one(&mut rx).await, None);
    }

    #[tokio::test]
    async fn test_redundant_mutations_do_not_renotify() {
        let page = Arc::new(FakePage::new());
        page.add_region(region(1, 100.0, 700.0, 600.0, 40.0), "");
        let (tx, mut rx) = mpsc::unbounded_channel();

        let _watch = ComposerWatch::spawn(page.clone(), tx);
        assert_eq!(drain_one(&mut rx).await, Some(ComposerHandle::new(RegionId(1))));

        for _ in 0..10 {
            page.trigger_mutation();
        }
        // Removing the region forces one real change; nothing may arrive
        // before it despite the burst of redundant ticks.
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        page.remove_region(RegionId(1));
        page.trigger_mutation();
        assert_eq!(drain_one(&mut rx).await, None);
    }

    #[tokio::test]
    async fn test_handle_churn_reports_each_identity_once() {
        let page = Arc::new(FakePage::new());
        let (tx, mut rx) = mpsc::unbounded_channel();

        let _watch = ComposerWatch::spawn(page.clone(), tx);
        assert_eq!(drain_one(&mut rx).await, None);

        page.add_region(region(5, 100.0, 700.0, 600.0, 40.0), "");
        page.trigger_mutation();
        assert_eq!(drain_one(&mut rx).await, Some(ComposerHandle::new(RegionId(5))));

        page.remove_region(RegionId(5));
        page.add_region(region(6, 100.0, 700.0, 600.0, 40.0), "");
        page.trigger_mutation();
        assert_eq!(drain_one(&mut rx).await, Some(ComposerHandle::new(RegionId(6))));
    }
}
