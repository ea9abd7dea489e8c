use proptest::prelude::*;
use vdraw_core::color::Rgba;
use vdraw_core::geometry::{Point2, Vector2};
use vdraw_core::scene_shape::{SceneShape, ShapeId, Style};
use vdraw_core::shape::{Circle, Polygon, PolygonKind};
use vdraw_engine::collection::{ShapeCollection, ShapeList};
use vdraw_engine::scene::SceneManager;

#[derive(Debug, Clone)]
enum Op {
    Move(f64, f64),
    Rotate(f64),
    Scale(f64),
    MirrorX,
    MirrorY,
    Restyle(u8, u8, u8, f64),
    Delete,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (-100.0f64..100.0, -100.0f64..100.0).prop_map(|(x, y)| Op::Move(x, y)),
        (-360.0f64..360.0).prop_map(Op::Rotate),
        prop_oneof![0.25f64..4.0, -4.0f64..-0.25].prop_map(Op::Scale),
        Just(Op::MirrorX),
        Just(Op::MirrorY),
        (any::<u8>(), any::<u8>(), any::<u8>(), 0.0f64..1.0)
            .prop_map(|(r, g, b, o)| Op::Restyle(r, g, b, o)),
        Just(Op::Delete),
    ]
}

fn sample_scene() -> ShapeList {
    let triangle = Polygon::triangle(
        Point2::new(0.0, 0.0),
        Point2::new(30.0, 0.0),
        Point2::new(4.0, 12.0),
    );
    let pentagon = Polygon::new(
        PolygonKind::Polygon,
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(10.0, -3.0),
            Point2::new(14.0, 6.0),
            Point2::new(6.0, 11.0),
            Point2::new(-2.0, 7.0),
        ],
    )
    .expect("five vertices");
    ShapeList::from(vec![
        SceneShape::new("Triangle 1", triangle),
        SceneShape::new(
            "Circle 1",
            Circle::new(Point2::new(5.0, 5.0), 7.5).expect("positive radius"),
        ),
        SceneShape::new(
            "Rectangle 1",
            Polygon::rectangle(Point2::new(-5.0, -5.0), Point2::new(20.0, 8.0)),
        ),
        SceneShape::new("Polygon 1", pentagon),
    ])
}

fn apply(scene: &mut SceneManager, shapes: &mut ShapeList, id: ShapeId, op: &Op) {
    let result = match op {
        Op::Move(x, y) => scene.move_shape(shapes, id, Vector2::new(*x, *y)),
        Op::Rotate(angle) => scene.rotate(shapes, id, *angle),
        Op::Scale(ratio) => scene.scale(shapes, id, *ratio),
        Op::MirrorX => scene.mirror_x(shapes, id),
        Op::MirrorY => scene.mirror_y(shapes, id),
        Op::Restyle(r, g, b, opacity) => {
            scene.change_style(shapes, id, Style::new(Rgba::rgb(*r, *g, *b), Rgba::BLACK, *opacity))
        }
        Op::Delete => scene.delete(shapes, id),
    };
    result.expect("command applies to a present shape");
}

fn assert_scenes_close(actual: &ShapeList, expected: &ShapeList) {
    assert_eq!(actual.ids(), expected.ids());
    for (a, e) in actual.iter().zip(expected.iter()) {
        assert_eq!(a.name, e.name);
        assert_eq!(a.style, e.style);
        assert_eq!(a.layer_name, e.layer_name);
        assert_eq!(a.is_visible, e.is_visible);
        assert_eq!(a.kind(), e.kind());
        let (pa, pe) = (a.shape.defining_points(), e.shape.defining_points());
        assert_eq!(pa.len(), pe.len());
        for (p, q) in pa.iter().zip(&pe) {
            assert!((p.x() - q.x()).abs() < 1e-6, "{p:?} vs {q:?}");
            assert!((p.y() - q.y()).abs() < 1e-6, "{p:?} vs {q:?}");
        }
        if let (Some(ca), Some(ce)) = (a.shape.as_circle(), e.shape.as_circle()) {
            assert!((ca.radius() - ce.radius()).abs() < 1e-6);
        }
    }
}

proptest! {
    #[test]
    fn execute_then_undo_restores_state(target in 0usize..4, op in op()) {
        let mut shapes = sample_scene();
        let before = shapes.clone();
        let id = shapes.get(target).expect("sample has four shapes").id();

        let mut scene = SceneManager::new();
        apply(&mut scene, &mut shapes, id, &op);
        prop_assert!(scene.undo(&mut shapes).expect("undo"));
        assert_scenes_close(&shapes, &before);
    }

    #[test]
    fn undo_then_redo_replays_last_command(
        first in (0usize..4, op()),
        second in (0usize..4, op()),
    ) {
        let mut shapes = sample_scene();
        let mut scene = SceneManager::new();

        let first_id = shapes.get(first.0).expect("present").id();
        apply(&mut scene, &mut shapes, first_id, &first.1);
        // 第一步可能删除了目标，第二步只作用于仍存在的图形。
        let second_id = shapes.get(second.0 % shapes.len()).expect("present").id();
        apply(&mut scene, &mut shapes, second_id, &second.1);
        let after_both = shapes.clone();

        prop_assert!(scene.undo(&mut shapes).expect("undo"));
        prop_assert!(scene.redo(&mut shapes).expect("redo"));
        assert_scenes_close(&shapes, &after_both);
    }

    #[test]
    fn full_unwind_restores_initial_scene(ops in prop::collection::vec((0usize..4, op()), 1..12)) {
        let mut shapes = sample_scene();
        let initial = shapes.clone();
        let mut scene = SceneManager::new();

        for (target, op) in &ops {
            if shapes.is_empty() {
                break;
            }
            let id = shapes.get(target % shapes.len()).expect("present").id();
            apply(&mut scene, &mut shapes, id, op);
        }
        while scene.undo(&mut shapes).expect("undo") {}
        assert_scenes_close(&shapes, &initial);
    }
}

#[test]
fn new_command_after_undo_disables_redo() {
    let mut shapes = sample_scene();
    let id = shapes.get(0).expect("present").id();
    let mut scene = SceneManager::new();

    scene
        .move_shape(&mut shapes, id, Vector2::new(1.0, 1.0))
        .expect("move");
    scene.undo(&mut shapes).expect("undo");
    assert!(scene.can_redo());

    scene.rotate(&mut shapes, id, 45.0).expect("rotate");
    assert!(!scene.can_redo());
    assert!(!scene.redo(&mut shapes).expect("redo is a no-op"));
}

#[test]
fn delete_middle_then_undo_restores_order() {
    let mut shapes = sample_scene();
    let ids = shapes.ids();
    let mut scene = SceneManager::new();

    scene.delete(&mut shapes, ids[1]).expect("delete");
    assert_eq!(shapes.ids(), vec![ids[0], ids[2], ids[3]]);
    scene.undo(&mut shapes).expect("undo");
    assert_eq!(shapes.ids(), ids);
}

#[test]
fn mirror_twice_is_identity_and_each_step_undoes() {
    let mut shapes = sample_scene();
    let before = shapes.clone();
    let id = shapes.get(0).expect("present").id();
    let mut scene = SceneManager::new();

    scene.mirror_x(&mut shapes, id).expect("mirror");
    scene.mirror_x(&mut shapes, id).expect("mirror again");
    assert_scenes_close(&shapes, &before);
    assert_eq!(scene.history().undo_depth(), 2);

    scene.undo(&mut shapes).expect("undo");
    assert_ne!(
        shapes.find(id).expect("present").shape,
        before.find(id).expect("present").shape
    );
}
