#[cfg(test)]
mod _tests_display {
    use super::super::lattice_display::*;
    use crate::config::{EngineConfig, DEFAULT_SCALE};
    use crate::interfaces::{PointVariant, Space};
    use crate::lattice::basis_b;
    use crate::render::{HeadlessHandle, HeadlessSurface, Layer, SurfaceEvent};
    use nalgebra::Vector2;

    fn mount(props: DisplayProps) -> (LatticeDisplay<HeadlessSurface>, HeadlessHandle) {
        let surface = HeadlessSurface::new(640.0, 480.0);
        let handle = surface.handle();
        (LatticeDisplay::mount(surface, EngineConfig::default(), props), handle)
    }

    #[test]
    fn test_mount_uses_props() {
        let (display, handle) = mount(DisplayProps::dual_view());
        let engine = display.engine().expect("mounted");
        assert!(!engine.state().show_primal);
        assert!(engine.state().show_dual);
        assert_eq!(engine.state().shortest_space, Space::Dual);
        assert_eq!(engine.state().cvp_space, Space::Dual);
        assert_eq!(engine.scene().count(Layer::Lattice), 0);
        assert_eq!(engine.scene().count(Layer::DualLattice), 441);
        assert_eq!(handle.listener_count(), 2);
        assert_eq!(display.props().dual_point_variant, PointVariant::Hollow);
    }

    #[test]
    fn test_update_only_forwards_changed_props() {
        let (mut display, _handle) = mount(DisplayProps::default());

        assert!(display.update(DisplayProps::default()).is_empty());

        let props = DisplayProps {
            show_dual: true,
            cvp_radius_factor: 0.8,
            ..DisplayProps::default()
        };
        assert_eq!(
            display.update(props.clone()),
            vec![PropChange::ShowDual, PropChange::CvpRadiusFactor]
        );
        assert!(display.update(props.clone()).is_empty());

        let b = basis_b();
        let props = DisplayProps {
            basis: b,
            mod_projection_divider: 3,
            ..props
        };
        assert_eq!(
            display.update(props),
            vec![PropChange::Basis, PropChange::ModProjection]
        );
        let state = display.engine().expect("mounted").state();
        assert_eq!(state.basis, b);
        assert_eq!(state.mod_projection_divider, 3);
        assert!(state.show_dual);
    }

    #[test]
    fn test_mount_only_props_are_not_forwarded() {
        let (mut display, _handle) = mount(DisplayProps::default());
        let props = DisplayProps {
            show_fundamental_domain: true,
            show_cvp_residual_arrow: true,
            ..DisplayProps::default()
        };
        assert!(display.update(props).is_empty());
        assert!(display.props().show_fundamental_domain);
    }

    #[test]
    fn test_unmount_is_exactly_once() {
        let (mut display, handle) = mount(DisplayProps::default());
        assert!(display.unmount());
        assert!(!display.is_mounted());
        assert_eq!(handle.listener_count(), 0);
        assert!(handle.is_detached());

        assert!(!display.unmount());
        drop(display);
        assert!(handle.is_detached());
    }

    #[test]
    fn test_unmounted_display_ignores_operations() {
        let (mut display, handle) = mount(DisplayProps::default());
        display.unmount();
        let drawn = handle.frames_drawn();

        display.relayout(true);
        display.became_visible(false);
        display.set_basis(Vector2::new(2.0, 0.0), Vector2::new(0.0, 2.0));
        display.set_scale(80.0, None);
        display.set_mod_vector(Some(Vector2::new(0.1, 0.2)));
        display.handle_event(SurfaceEvent::Resize);
        display.tick();
        let changes = display.update(DisplayProps {
            show_dual: true,
            ..DisplayProps::default()
        });

        assert!(changes.is_empty());
        assert_eq!(handle.frames_drawn(), drawn);
        assert!(display.engine().is_none());
    }

    #[test]
    fn test_passthroughs_reach_engine() {
        let (mut display, handle) = mount(DisplayProps::default());
        display.set_scale(100.0, Some(0.0));
        display.set_mod_vector(Some(Vector2::new(0.5, 0.0)));
        let engine = display.engine().expect("mounted");
        assert_eq!(engine.state().scale, 100.0);
        assert_eq!(engine.scene().count(Layer::Mod), 3);

        handle.set_size(200.0, 200.0);
        display.handle_event(SurfaceEvent::Resize);
        let origin = display.engine().and_then(|e| e.layout()).map(|l| l.origin);
        assert_eq!(origin.map(|o| (o.x, o.y)), Some((100.0, 100.0)));
    }

    #[test]
    fn test_invalid_scale_prop_is_not_reforwarded() {
        let nan_props = DisplayProps {
            scale: f64::NAN,
            ..DisplayProps::default()
        };
        let (mut display, _handle) = mount(nan_props.clone());
        assert_eq!(display.props().scale, DEFAULT_SCALE);

        assert!(display.update(nan_props.clone()).is_empty());
        assert!(display.update(nan_props).is_empty());

        let zoomed = DisplayProps {
            scale: 200.0,
            ..DisplayProps::default()
        };
        assert_eq!(display.update(zoomed), vec![PropChange::Scale]);
        let negative = DisplayProps {
            scale: -1.0,
            ..DisplayProps::default()
        };
        assert!(display.update(negative).is_empty());
        assert_eq!(display.props().scale, 200.0);
    }
}
