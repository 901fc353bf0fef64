//! Step-by-step collision scenarios
//!
//! Each test drives a manager through several updates and checks which
//! pairs are reported as new collisions at every step.

use crate::foundation::logging;
use crate::foundation::math::{Mat3, Mat3Ext, Vec2};
use crate::physics::{
    CellGrid, CollisionError, CollisionManager, CollisionPair, GridConfig, HullShape, ShapeKind,
};

fn two_circles() -> CollisionManager {
    logging::init_for_tests();

    let mut manager = CollisionManager::new();
    manager.register_circle(1, 1, Vec2::new(0.0, 0.0), 5.0).unwrap();
    manager.register_circle(2, 2, Vec2::new(9.0, 0.0), 5.0).unwrap();
    manager
}

fn sorted_pairs(manager: &CollisionManager) -> Vec<CollisionPair> {
    let mut pairs = manager.collided_pairs().to_vec();
    pairs.sort();
    pairs
}

#[test]
fn test_onset_reported_then_cleared_after_separation() {
    let mut manager = two_circles();

    manager.update();
    assert_eq!(manager.collided_pairs(), &[CollisionPair::new(2, 1)]);

    manager.move_object(2, Vec2::new(20.0, 0.0), true).unwrap();
    manager.update();
    assert!(manager.collided_pairs().is_empty());

    manager.update();
    assert!(manager.collided_pairs().is_empty());
}

#[test]
fn test_sustained_overlap_reported_once() {
    let mut manager = two_circles();

    manager.update();
    assert_eq!(manager.collided_pairs().len(), 1);
    for _ in 0..3 {
        manager.update();
        assert!(manager.collided_pairs().is_empty());
        assert!(manager.is_overlapping(1, 2));
    }
}

#[test]
fn test_reoverlap_reported_again() {
    let mut manager = two_circles();
    manager.update();

    manager.move_object(2, Vec2::new(20.0, 0.0), false).unwrap();
    manager.update();
    assert!(!manager.is_overlapping(1, 2));

    manager.move_object(2, Vec2::new(-20.0, 0.0), false).unwrap();
    manager.update();
    assert_eq!(manager.collided_pairs(), &[CollisionPair::new(1, 2)]);
}

#[test]
fn test_same_group_never_collides() {
    let mut manager = CollisionManager::new();
    manager.register_circle(1, 7, Vec2::new(0.0, 0.0), 5.0).unwrap();
    manager.register_circle(2, 7, Vec2::new(1.0, 0.0), 5.0).unwrap();

    manager.update();
    assert!(manager.collided_pairs().is_empty());
    assert!(manager.intersects(1, 2).unwrap());
}

#[test]
fn test_duplicate_id_keeps_first_hull() {
    let mut manager = CollisionManager::new();
    manager.register_circle(1, 1, Vec2::new(0.0, 0.0), 5.0).unwrap();

    let result = manager.register_point(1, 2, Vec2::new(100.0, 100.0));
    assert_eq!(result, Err(CollisionError::DuplicateId(1)));

    let hull = manager.hull(1).unwrap();
    assert_eq!(hull.kind(), ShapeKind::Circle);
    assert_eq!(hull.group(), 1);
    assert_eq!(hull.position(), Vec2::new(0.0, 0.0));
    assert_eq!(manager.len(), 1);
}

#[test]
fn test_unknown_id_operations_fail() {
    let mut manager = two_circles();
    assert_eq!(manager.move_object(9, Vec2::zeros(), true), Err(CollisionError::UnknownId(9)));
    assert_eq!(manager.rotate_object(9, 45.0, false), Err(CollisionError::UnknownId(9)));
    assert_eq!(manager.transform_object(9, &Mat3::identity()), Err(CollisionError::UnknownId(9)));
    assert_eq!(manager.intersects(1, 9), Err(CollisionError::UnknownId(9)));
}

#[test]
fn test_unregister_forgets_overlap() {
    let mut manager = two_circles();
    manager.update();

    assert!(manager.unregister(2));
    assert!(!manager.unregister(2));
    assert!(!manager.is_overlapping(1, 2));

    manager.register_circle(2, 2, Vec2::new(9.0, 0.0), 5.0).unwrap();
    manager.update();
    assert_eq!(manager.collided_pairs(), &[CollisionPair::new(2, 1)]);
}

#[test]
fn test_pair_leaving_neighbourhood_is_forgotten() {
    let mut manager = two_circles();
    manager.update();

    // far enough that the pair is never evaluated in between
    manager.move_object(2, Vec2::new(5000.0, 5000.0), true).unwrap();
    manager.update();
    assert!(manager.collided_pairs().is_empty());
    assert!(!manager.is_overlapping(1, 2));

    manager.move_object(2, Vec2::new(9.0, 0.0), true).unwrap();
    manager.update();
    assert_eq!(manager.collided_pairs(), &[CollisionPair::new(2, 1)]);
}

#[test]
fn test_adjacent_cells_are_candidates() {
    let mut manager = CollisionManager::new();
    manager.register_circle(1, 1, Vec2::new(49.0, 10.0), 2.0).unwrap();
    manager.register_circle(2, 2, Vec2::new(51.0, 10.0), 2.0).unwrap();

    manager.update();
    assert_eq!(manager.collided_pairs(), &[CollisionPair::new(2, 1)]);
}

#[test]
fn test_candidates_limited_to_neighbouring_cells() {
    let mut manager = CollisionManager::new();
    manager.register_circle(1, 1, Vec2::new(0.0, 0.0), 200.0).unwrap();
    manager.register_circle(2, 2, Vec2::new(160.0, 0.0), 200.0).unwrap();

    manager.update();
    assert!(manager.collided_pairs().is_empty());
    assert!(manager.intersects(1, 2).unwrap());
}

#[test]
fn test_several_onsets_in_one_step() {
    let mut manager = two_circles();
    manager.register_point(3, 3, Vec2::new(1.0, 0.0)).unwrap();

    manager.update();
    assert_eq!(sorted_pairs(&manager), vec![CollisionPair::new(2, 1), CollisionPair::new(3, 1)]);
}

#[test]
fn test_point_enters_polygon() {
    let mut manager = CollisionManager::new();
    let square = vec![
        Vec2::new(0.0, 0.0),
        Vec2::new(20.0, 0.0),
        Vec2::new(20.0, 20.0),
        Vec2::new(0.0, 20.0),
    ];
    manager.register_polygon(10, 1, square).unwrap();
    manager.register_point(11, 2, Vec2::new(30.0, 10.0)).unwrap();

    manager.update();
    assert!(manager.collided_pairs().is_empty());

    manager.move_object(11, Vec2::new(-15.0, 0.0), false).unwrap();
    manager.update();
    assert_eq!(manager.collided_pairs(), &[CollisionPair::new(10, 11)]);
}

#[test]
fn test_rotated_polygon_reaches_point() {
    let mut manager = CollisionManager::new();
    let bar = vec![
        Vec2::new(10.0, -1.0),
        Vec2::new(14.0, -1.0),
        Vec2::new(14.0, 1.0),
        Vec2::new(10.0, 1.0),
    ];
    manager.register_polygon(1, 1, bar).unwrap();
    manager.register_point(2, 2, Vec2::new(0.0, 12.0)).unwrap();

    manager.update();
    assert!(manager.collided_pairs().is_empty());

    manager.rotate_object(1, 90.0, true).unwrap();
    manager.update();
    assert_eq!(manager.collided_pairs(), &[CollisionPair::new(2, 1)]);

    let HullShape::Polygon(polygon) = manager.hull(1).unwrap().shape() else {
        panic!("expected a polygon");
    };
    assert!((polygon.centroid() - Vec2::new(0.0, 12.0)).norm() < 1e-4);
}

#[test]
fn test_transform_moves_hull_into_range() {
    let mut manager = CollisionManager::new();
    manager.register_circle(1, 1, Vec2::new(0.0, 0.0), 3.0).unwrap();
    manager.register_circle(2, 2, Vec2::new(100.0, 0.0), 3.0).unwrap();

    manager.update();
    assert!(manager.collided_pairs().is_empty());

    manager.transform_object(1, &Mat3::translation(Vec2::new(97.0, 0.0))).unwrap();
    manager.update();
    assert_eq!(manager.collided_pairs(), &[CollisionPair::new(2, 1)]);
}

#[test]
fn test_clear_resets_everything() {
    let mut manager = two_circles();
    manager.update();

    manager.clear();
    assert!(manager.is_empty());
    assert!(manager.collided_pairs().is_empty());
    assert!(!manager.is_overlapping(1, 2));

    manager.register_point(1, 1, Vec2::zeros()).unwrap();
    assert_eq!(manager.len(), 1);
}

#[test]
fn test_custom_grid() {
    let grid = CellGrid::new(GridConfig {
        origin: Vec2::new(-100.0, -100.0),
        width: 200.0,
        height: 200.0,
        cell_size: 10.0,
    })
    .unwrap();
    let mut manager = CollisionManager::with_grid(Box::new(grid));
    manager.register_point(1, 1, Vec2::new(-55.0, -55.0)).unwrap();
    manager.register_circle(2, 2, Vec2::new(-52.0, -55.0), 3.0).unwrap();

    manager.update();
    assert_eq!(manager.collided_pairs(), &[CollisionPair::new(2, 1)]);
    assert_eq!(manager.hulls().map(|hull| hull.id()).collect::<Vec<_>>(), vec![1, 2]);
}
