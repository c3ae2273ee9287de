#![allow(dead_code)]

use std::{collections::HashMap, sync::Arc};

use geo::{polygon, MultiPolygon};
use openmander_engine::UnitGraph;

pub fn square(x: f64, y: f64) -> MultiPolygon<f64> {
    MultiPolygon(vec![polygon![
        (x: x, y: y), (x: x + 1.0, y: y), (x: x + 1.0, y: y + 1.0), (x: x, y: y + 1.0),
    ]])
}

/// `rows` x `cols` unit squares, row-major from the bottom-left. Every unit gets
/// `pop(row, col)` people and a dem/rep vote split that leans by column.
pub fn grid(rows: usize, cols: usize, pop: impl Fn(usize, usize) -> i64) -> Arc<UnitGraph> {
    let mut ids = Vec::new();
    let mut shapes = Vec::new();
    let (mut pops, mut dem, mut rep) = (Vec::new(), Vec::new(), Vec::new());
    for r in 0..rows {
        for c in 0..cols {
            ids.push(format!("{r:02}{c:02}"));
            shapes.push(square(c as f64, r as f64));
            pops.push(pop(r, c));
            dem.push(10 + c as i64);
            rep.push(10 + (cols - c) as i64);
        }
    }
    let weights = HashMap::from([
        ("pop".to_string(), pops),
        ("dem".to_string(), dem),
        ("rep".to_string(), rep),
    ]);
    Arc::new(UnitGraph::from_shapes(ids, shapes, weights, HashMap::new()).expect("grid builds"))
}

pub fn uniform_grid(rows: usize, cols: usize) -> Arc<UnitGraph> { grid(rows, cols, |_, _| 1) }

/// Two triangles {0,1,2} and {4,5,6} joined through bridge unit 3, with unit 7
/// hanging off the bridge. Population 1 everywhere.
pub fn dumbbell() -> Arc<UnitGraph> {
    let adjacency: Vec<Vec<u32>> = vec![
        vec![1, 2], vec![0, 2], vec![0, 1, 3],
        vec![2, 4, 7],
        vec![3, 5, 6], vec![4, 6], vec![4, 5],
        vec![3],
    ];
    let lengths = adjacency.iter().map(|n| vec![1.0; n.len()]).collect();
    let n = adjacency.len();
    Arc::new(UnitGraph::new(
        (0..n).map(|i| format!("d{i}")).collect(),
        vec![MultiPolygon(vec![]); n],
        adjacency,
        Some(lengths),
        HashMap::from([("pop".to_string(), vec![1; n])]),
        HashMap::new(),
    ).expect("dumbbell builds"))
}
