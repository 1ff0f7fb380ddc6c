#[cfg(test)]
mod _tests_engine {
    use super::super::engine::*;
    use super::super::scene::{ElementId, ElementKey, Frame, Layer, Shape};
    use super::super::surface::{HeadlessHandle, HeadlessSurface, ListenerKind, SurfaceEvent};
    use crate::config::{EngineConfig, DEFAULT_SCALE, MAX_POINT_RANGE};
    use crate::interfaces::Space;
    use crate::lattice::basis_b;
    use approx::assert_abs_diff_eq;
    use nalgebra::{Point2, Vector2};
    use std::cell::RefCell;
    use std::rc::Rc;

    const STEP_MS: f64 = 16.0;

    fn mount(options: EngineOptions) -> (LatticeEngine<HeadlessSurface>, HeadlessHandle) {
        let surface = HeadlessSurface::new(800.0, 600.0);
        let handle = surface.handle();
        let engine = LatticeEngine::new(surface, EngineConfig::default(), options);
        (engine, handle)
    }

    fn record(engine: &mut LatticeEngine<HeadlessSurface>) -> Rc<RefCell<Vec<EngineEvent>>> {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        engine.set_observer(move |event| sink.borrow_mut().push(event.clone()));
        events.borrow_mut().clear();
        events
    }

    fn circle_at(frame: &Frame, layer: Layer, i: i32, j: i32) -> (Point2<f64>, f64, f64) {
        match frame.get(&ElementKey::new(layer, ElementId::Point { i, j })) {
            Some(Shape::Circle { center, radius, style }) => (*center, *radius, style.opacity),
            other => panic!("expected point ({}, {}) in {:?}, got {:?}", i, j, layer, other),
        }
    }

    fn frame(handle: &HeadlessHandle) -> Frame {
        handle.last_frame().expect("a frame was drawn")
    }

    #[test]
    fn test_new_subscribes_and_draws() {
        let (engine, handle) = mount(EngineOptions::default());

        assert_eq!(handle.listener_count(), 2);
        assert!(handle.is_subscribed(ListenerKind::Resize));
        assert!(handle.is_subscribed(ListenerKind::Click));
        assert_eq!(handle.frames_drawn(), 1);
        assert!(!engine.is_animating());

        let frame = frame(&handle);
        assert_eq!(frame.count(Layer::Lattice), 441);
        let (center, _, _) = circle_at(&frame, Layer::Lattice, 1, 0);
        assert_eq!(center, Point2::new(560.0, 300.0));
    }

    #[test]
    fn test_missing_container_degrades_silently() {
        let surface = HeadlessSurface::without_container();
        let handle = surface.handle();
        let mut engine = LatticeEngine::new(surface, EngineConfig::default(), EngineOptions::default());

        assert!(engine.layout().is_none());
        assert!(engine.current_frame().is_none());
        engine.set_basis(Vector2::new(1.0, 0.0), Vector2::new(0.0, 1.0));
        handle.dispatch(&mut engine, SurfaceEvent::Click { x: 10.0, y: 10.0 });
        assert_eq!(handle.frames_drawn(), 0);

        handle.set_size(400.0, 400.0);
        assert!(handle.dispatch(&mut engine, SurfaceEvent::Resize));
        assert_eq!(handle.frames_drawn(), 1);
        assert_eq!(engine.layout().map(|l| l.origin), Some(Point2::new(200.0, 200.0)));
    }

    #[test]
    fn test_destroy_releases_listeners() {
        let (mut engine, handle) = mount(EngineOptions::default());
        assert!(handle.dispatch(&mut engine, SurfaceEvent::Resize));
        let drawn = handle.frames_drawn();

        engine.destroy();

        assert_eq!(handle.listener_count(), 0);
        assert!(handle.is_detached());
        assert!(handle.last_frame().is_none());
        assert!(!handle.accepts(&SurfaceEvent::Resize));
        assert!(!handle.accepts(&SurfaceEvent::Click { x: 400.0, y: 300.0 }));
        assert_eq!(handle.frames_drawn(), drawn);
    }

    #[test]
    fn test_drop_releases_listeners() {
        let (engine, handle) = mount(EngineOptions::default());
        drop(engine);
        assert_eq!(handle.listener_count(), 0);
        assert!(handle.is_detached());
    }

    #[test]
    fn test_observer_receives_current_texts() {
        let (mut engine, _handle) = mount(EngineOptions::default());
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        engine.set_observer(move |event| sink.borrow_mut().push(event.clone()));

        let events = events.borrow();
        assert_eq!(events.len(), 3);
        assert_eq!(
            events[0],
            EngineEvent::BasisText("b1 = (1.00, 0.00), b2 = (0.40, 1.00)".to_string())
        );
        assert_eq!(
            events[1],
            EngineEvent::DualBasisText("b1 = (1.00, -0.40), b2 = (0.00, 1.00)".to_string())
        );
        assert_eq!(
            events[2],
            EngineEvent::CvpText("CVP cap |v_shortest|/2 = 0.50, d = 0.30 (factor 0.60)".to_string())
        );
    }

    #[test]
    fn test_set_basis_animates_to_new_positions() {
        let (mut engine, handle) = mount(EngineOptions::default());
        let events = record(&mut engine);
        let b = basis_b();

        engine.set_basis(b.b1, b.b2);
        assert!(engine.is_animating());
        assert!(events
            .borrow()
            .contains(&EngineEvent::BasisText("b1 = (1.00, 0.30), b2 = (-0.20, 1.00)".to_string())));

        // Still at the old position when the transition starts.
        let (start, _, _) = circle_at(&frame(&handle), Layer::Lattice, 1, 0);
        assert_abs_diff_eq!(start.y, 300.0, epsilon = 1e-9);

        handle.run_animations(&mut engine, STEP_MS, 5_000.0);
        assert!(!engine.is_animating());
        let (end, _, _) = circle_at(&frame(&handle), Layer::Lattice, 1, 0);
        assert_abs_diff_eq!(end.x, 560.0, epsilon = 1e-9);
        assert_abs_diff_eq!(end.y, 300.0 - 0.3 * 160.0, epsilon = 1e-9);
    }

    #[test]
    fn test_interrupted_transition_continues_from_current_value() {
        let (mut engine, handle) = mount(EngineOptions::default());
        let b = basis_b();

        engine.set_basis(b.b1, b.b2);
        handle.advance(600.0);
        let mid = engine.current_frame().expect("laid out");
        let (mid_center, _, _) = circle_at(&mid, Layer::Lattice, 0, 1);
        assert_abs_diff_eq!(mid_center.x, 400.0 + 0.1 * 160.0, epsilon = 1e-9);

        engine.set_basis(Vector2::new(1.0, 0.0), Vector2::new(0.4, 1.0));
        let restarted = engine.current_frame().expect("laid out");
        let (from, _, _) = circle_at(&restarted, Layer::Lattice, 0, 1);
        assert_abs_diff_eq!(from.x, mid_center.x, epsilon = 1e-9);
        assert_abs_diff_eq!(from.y, mid_center.y, epsilon = 1e-9);

        handle.run_animations(&mut engine, STEP_MS, 5_000.0);
        let (end, _, _) = circle_at(&frame(&handle), Layer::Lattice, 0, 1);
        assert_abs_diff_eq!(end.x, 464.0, epsilon = 1e-9);
    }

    #[test]
    fn test_repeated_setter_keeps_target_scene() {
        let (mut engine, handle) = mount(EngineOptions::default());
        engine.set_show_dual(true);
        let scene = engine.scene().clone();
        handle.advance(300.0);
        let halfway = engine.current_frame().expect("laid out");

        engine.set_show_dual(true);
        engine.set_show_shortest(true);
        engine.set_shortest_space(Space::Primal);
        assert_eq!(engine.scene(), &scene);
        assert_eq!(engine.current_frame().expect("laid out"), halfway);
    }

    #[test]
    fn test_show_dual_grows_from_origin() {
        let (mut engine, handle) = mount(EngineOptions::default());
        engine.set_show_dual(true);

        let (start, _, _) = circle_at(&frame(&handle), Layer::DualLattice, 2, 3);
        assert_eq!(start, Point2::new(400.0, 300.0));

        handle.run_animations(&mut engine, STEP_MS, 5_000.0);
        let dual = engine.dual_basis();
        let expected = Point2::new(
            400.0 + dual.point(2, 3).x * 160.0,
            300.0 - dual.point(2, 3).y * 160.0,
        );
        let (end, _, _) = circle_at(&frame(&handle), Layer::DualLattice, 2, 3);
        assert_abs_diff_eq!(end.x, expected.x, epsilon = 1e-9);
        assert_abs_diff_eq!(end.y, expected.y, epsilon = 1e-9);

        engine.set_show_dual(false);
        assert_eq!(frame(&handle).count(Layer::DualLattice), 0);
    }

    #[test]
    fn test_click_on_primal_point() {
        let (mut engine, handle) = mount(EngineOptions::default());
        let events = record(&mut engine);

        assert!(handle.dispatch(&mut engine, SurfaceEvent::Click { x: 562.0, y: 301.0 }));
        let events = events.borrow();
        assert_eq!(events.len(), 1);
        match &events[0] {
            EngineEvent::PointSelected(selection) => {
                assert_eq!(selection.space, Space::Primal);
                assert_eq!((selection.index.i, selection.index.j), (1, 0));
                assert_abs_diff_eq!(selection.position.x, 1.0);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_background_click_without_cvp() {
        let (mut engine, handle) = mount(EngineOptions::default());
        let events = record(&mut engine);

        handle.dispatch(&mut engine, SurfaceEvent::Click { x: 480.0, y: 220.0 });
        assert_eq!(*events.borrow(), vec![EngineEvent::BackgroundClick]);
        assert!(engine.state().cvp_target.is_none());
        assert_eq!(engine.scene().count(Layer::Cvp), 0);
    }

    #[test]
    fn test_background_click_sets_cvp_target() {
        let options = EngineOptions {
            cvp_enabled: true,
            ..EngineOptions::default()
        };
        let (mut engine, handle) = mount(options);

        // Lattice coordinates (1.1, 0.05): nearest point (1, 0) inside the radius.
        handle.dispatch(&mut engine, SurfaceEvent::Click { x: 576.0, y: 292.0 });
        assert_eq!(engine.state().cvp_target, Some(Point2::new(576.0, 292.0)));
        assert!(engine.is_animating());
        let hit = engine.facts().cvp.nearest.expect("within radius");
        assert_eq!((hit.index.i, hit.index.j), (1, 0));

        let key = ElementKey::new(Layer::Cvp, ElementId::CvpRadius);
        match frame(&handle).get(&key) {
            Some(Shape::Circle { radius, .. }) => assert_abs_diff_eq!(*radius, 0.0),
            other => panic!("unexpected {:?}", other),
        }
        handle.run_animations(&mut engine, STEP_MS, 5_000.0);
        match frame(&handle).get(&key) {
            Some(Shape::Circle { radius, .. }) => assert_abs_diff_eq!(*radius, 48.0, epsilon = 1e-9),
            other => panic!("unexpected {:?}", other),
        }

        engine.set_cvp_enabled(false);
        assert!(engine.state().cvp_target.is_none());
        assert_eq!(engine.scene().count(Layer::Cvp), 0);
    }

    #[test]
    fn test_cvp_text_tracks_radius_factor() {
        let (mut engine, _handle) = mount(EngineOptions::default());
        let events = record(&mut engine);

        engine.set_cvp_radius_factor(1.2);
        assert_eq!(
            *events.borrow(),
            vec![EngineEvent::CvpText(
                "CVP cap |v_shortest|/2 = 0.50, d = 0.60 (factor 1.20) -- above cap, CVP undefined"
                    .to_string()
            )]
        );
        assert!(engine.facts().cvp.over_cap);

        engine.set_cvp_radius_factor(1.0);
        assert!(!engine.facts().cvp.over_cap);
    }

    #[test]
    fn test_dual_click_projects_mod_vector() {
        let options = EngineOptions {
            show_dual: true,
            enable_mod_projection: true,
            mod_projection_divider: 4,
            ..EngineOptions::default()
        };
        let (mut engine, handle) = mount(options);
        let events = record(&mut engine);

        // Dual point (1, 0) = (1, -0.4).
        handle.dispatch(&mut engine, SurfaceEvent::Click { x: 560.0, y: 364.0 });
        let vec = engine.state().mod_vector.expect("inside the radius");
        assert_abs_diff_eq!(vec.x, 0.25, epsilon = 1e-9);
        assert_abs_diff_eq!(vec.y, -0.1, epsilon = 1e-9);
        assert!(matches!(
            events.borrow()[0],
            EngineEvent::PointSelected(PointSelection { space: Space::Dual, .. })
        ));
        assert_eq!(events.borrow()[1], EngineEvent::ModVector(Some(vec)));
        assert_eq!(engine.scene().count(Layer::Mod), 3);

        // Dual point (2, 0) scaled by 1/4 lies outside the radius.
        handle.dispatch(&mut engine, SurfaceEvent::Click { x: 720.0, y: 428.0 });
        assert!(engine.state().mod_vector.is_none());
        assert_eq!(engine.scene().count(Layer::Mod), 0);

        engine.set_mod_vector(Some(Vector2::new(0.1, 0.1)));
        events.borrow_mut().clear();
        engine.set_mod_projection(true, 2);
        assert!(engine.state().mod_vector.is_none());
        assert_eq!(*events.borrow(), vec![EngineEvent::ModVector(None)]);
    }

    #[test]
    fn test_set_scale_clears_target_and_rescales_mod_vector() {
        let options = EngineOptions {
            cvp_enabled: true,
            ..EngineOptions::default()
        };
        let (mut engine, handle) = mount(options);
        handle.dispatch(&mut engine, SurfaceEvent::Click { x: 576.0, y: 292.0 });
        engine.set_mod_vector(Some(Vector2::new(0.5, 0.5)));

        engine.set_scale(80.0, 600.0);
        assert!(engine.state().cvp_target.is_none());
        assert_eq!(engine.state().mod_vector, Some(Vector2::new(0.5, 0.5)));

        handle.run_animations(&mut engine, STEP_MS, 5_000.0);
        let frame = frame(&handle);
        let (center, _, _) = circle_at(&frame, Layer::Lattice, 1, 0);
        assert_abs_diff_eq!(center.x, 480.0, epsilon = 1e-9);
        match frame.get(&ElementKey::new(Layer::Mod, ElementId::ModPoint)) {
            Some(Shape::Circle { center, .. }) => {
                assert_abs_diff_eq!(center.x, 440.0, epsilon = 1e-9);
                assert_abs_diff_eq!(center.y, 260.0, epsilon = 1e-9);
            }
            other => panic!("unexpected {:?}", other),
        }

        engine.set_scale(-1.0, 600.0);
        assert_abs_diff_eq!(engine.state().scale, 80.0);
    }

    #[test]
    fn test_animated_relayout_reveals_points_from_origin() {
        let (mut engine, handle) = mount(EngineOptions::default());
        engine.relayout(true);

        // Index distance 5 gives a 200 ms delay.
        let (center, radius, opacity) = circle_at(&frame(&handle), Layer::Lattice, 3, 4);
        assert_eq!(center, Point2::new(400.0, 300.0));
        assert_abs_diff_eq!(radius, 0.0);
        assert_abs_diff_eq!(opacity, 0.0);

        handle.advance(200.0);
        let (still, _, _) = circle_at(&engine.current_frame().expect("laid out"), Layer::Lattice, 3, 4);
        assert_eq!(still, Point2::new(400.0, 300.0));

        handle.run_animations(&mut engine, STEP_MS, 5_000.0);
        let (end, radius, opacity) = circle_at(&frame(&handle), Layer::Lattice, 3, 4);
        assert_abs_diff_eq!(end.x, 400.0 + (3.0 + 4.0 * 0.4) * 160.0, epsilon = 1e-9);
        assert_abs_diff_eq!(end.y, 300.0 - 4.0 * 160.0, epsilon = 1e-9);
        assert_abs_diff_eq!(radius, 3.5);
        assert_abs_diff_eq!(opacity, 0.9);
    }

    #[test]
    fn test_resize_relayouts_statically() {
        let (mut engine, handle) = mount(EngineOptions::default());
        engine.became_visible(true);
        assert!(engine.is_animating());

        handle.set_size(1000.0, 400.0);
        handle.dispatch(&mut engine, SurfaceEvent::Resize);
        assert!(!engine.is_animating());
        let (center, _, _) = circle_at(&frame(&handle), Layer::Lattice, 0, 0);
        assert_eq!(center, Point2::new(500.0, 200.0));
    }

    #[test]
    fn test_set_basis_clears_cvp_target() {
        let options = EngineOptions {
            cvp_enabled: true,
            ..EngineOptions::default()
        };
        let (mut engine, handle) = mount(options);
        handle.dispatch(&mut engine, SurfaceEvent::Click { x: 576.0, y: 292.0 });
        assert!(engine.state().cvp_target.is_some());
        assert!(engine.scene().count(Layer::Cvp) > 0);

        let b = basis_b();
        engine.set_basis(b.b1, b.b2);
        assert!(engine.state().cvp_target.is_none());
        assert!(engine.facts().cvp.nearest.is_none());
        assert_eq!(engine.scene().count(Layer::Cvp), 0);
        assert!(engine.state().cvp_enabled);
    }

    #[test]
    fn test_cvp_in_dual_space_finds_dual_point() {
        let options = EngineOptions {
            show_dual: true,
            cvp_enabled: true,
            cvp_space: Space::Dual,
            ..EngineOptions::default()
        };
        let (mut engine, handle) = mount(options);

        // Lattice coordinates (1.1, -0.4): 0.1 from dual point (1, 0) = (1, -0.4),
        // outside its marker, inside the 0.3 radius.
        handle.dispatch(&mut engine, SurfaceEvent::Click { x: 576.0, y: 364.0 });
        assert_eq!(engine.state().cvp_target, Some(Point2::new(576.0, 364.0)));
        let hit = engine.facts().cvp.nearest.expect("within radius");
        assert_eq!((hit.index.i, hit.index.j), (1, 0));
        assert_abs_diff_eq!(hit.point.x, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(hit.point.y, -0.4, epsilon = 1e-12);

        handle.run_animations(&mut engine, STEP_MS, 5_000.0);
        match frame(&handle).get(&ElementKey::new(Layer::Cvp, ElementId::CvpNearest)) {
            Some(Shape::Circle { center, .. }) => {
                assert_abs_diff_eq!(center.x, 560.0, epsilon = 1e-9);
                assert_abs_diff_eq!(center.y, 364.0, epsilon = 1e-9);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_invalid_initial_scale_falls_back_to_default() {
        for scale in [f64::NAN, 0.0, -5.0, f64::INFINITY] {
            let (engine, handle) = mount(EngineOptions {
                scale,
                ..EngineOptions::default()
            });
            assert_abs_diff_eq!(engine.state().scale, DEFAULT_SCALE);
            let (center, _, _) = circle_at(&frame(&handle), Layer::Lattice, 1, 0);
            assert_eq!(center, Point2::new(560.0, 300.0));
        }
    }

    #[test]
    fn test_oversized_point_range_is_clamped() {
        let config = EngineConfig {
            point_range: 1_000_000,
            ..EngineConfig::default()
        };
        let engine = LatticeEngine::new(HeadlessSurface::new(800.0, 600.0), config, EngineOptions::default());
        assert_eq!(engine.config().point_range, MAX_POINT_RANGE);
    }
}
