//! Integration tests: vertical regridding on fixed and collocated grids.

use derivation::standard_registry;
use product_common::{DimensionKind, Product, Variable};
use regrid::{
    parse_vertical_grid, regrid_vertical_with_axis, regrid_vertical_with_collocated_product,
    CollocationPair, CollocationResult, InMemoryImporter, MatchMetadata,
};
use test_utils::{collocation_index_variable, f64_variable};

const TIME_VERTICAL: [(DimensionKind, usize); 2] = [
    (DimensionKind::Time, 2),
    (DimensionKind::Vertical, 3),
];

fn fixed_target(values: Vec<f64>) -> Variable {
    let n = values.len();
    f64_variable(
        "altitude",
        &[(DimensionKind::Vertical, n)],
        values,
        Some("m"),
    )
}

#[test]
fn test_linear_regrid_on_fixed_axis() {
    let mut product = Product::new();
    product
        .add_variable(f64_variable(
            "altitude",
            &[(DimensionKind::Vertical, 3)],
            vec![0.0, 1000.0, 2000.0],
            Some("m"),
        ))
        .unwrap();
    product
        .add_variable(f64_variable(
            "x",
            &[(DimensionKind::Vertical, 3)],
            vec![10.0, 20.0, 30.0],
            None,
        ))
        .unwrap();

    let target = fixed_target(vec![500.0, 1500.0]);
    regrid_vertical_with_axis(standard_registry(), &mut product, &target).unwrap();

    assert_eq!(
        product.get("x").unwrap().data().as_f64_slice().unwrap(),
        &[15.0, 25.0]
    );
    // The axis variable now equals the target grid.
    assert_eq!(
        product.get("altitude").unwrap().data().as_f64_slice().unwrap(),
        &[500.0, 1500.0]
    );
    assert_eq!(product.dimension_length(DimensionKind::Vertical), Some(2));
    product.verify().unwrap();
}

#[test]
fn test_fixed_axis_from_csv_grid() {
    let target = parse_vertical_grid("altitude [m]\n500\n1500\n").unwrap();
    let mut product = Product::new();
    product
        .add_variable(f64_variable(
            "altitude",
            &[(DimensionKind::Vertical, 3)],
            vec![0.0, 1000.0, 2000.0],
            Some("m"),
        ))
        .unwrap();
    product
        .add_variable(f64_variable(
            "temperature",
            &[(DimensionKind::Vertical, 3)],
            vec![280.0, 270.0, 260.0],
            Some("K"),
        ))
        .unwrap();
    regrid_vertical_with_axis(standard_registry(), &mut product, &target).unwrap();
    assert_eq!(
        product
            .get("temperature")
            .unwrap()
            .data()
            .as_f64_slice()
            .unwrap(),
        &[275.0, 265.0]
    );
}

#[test]
fn test_fixed_regrid_broadcasts_and_removes() {
    let mut product = Product::new();
    product
        .add_variable(f64_variable(
            "altitude",
            &TIME_VERTICAL,
            vec![0.0, 1000.0, 2000.0, 0.0, 1000.0, 2000.0],
            Some("m"),
        ))
        .unwrap();
    // Time-independent profile: must be broadcast along time.
    product
        .add_variable(f64_variable(
            "x",
            &[(DimensionKind::Vertical, 3)],
            vec![10.0, 20.0, 30.0],
            None,
        ))
        .unwrap();
    // Uncertainty profiles cannot be regridded and are dropped.
    product
        .add_variable(f64_variable(
            "x_uncertainty",
            &[(DimensionKind::Vertical, 3)],
            vec![1.0, 1.0, 1.0],
            None,
        ))
        .unwrap();

    let target = fixed_target(vec![500.0, 1500.0]);
    regrid_vertical_with_axis(standard_registry(), &mut product, &target).unwrap();

    assert!(!product.has_variable("x_uncertainty"));
    let x = product.get("x").unwrap();
    assert!(x.has_dimension_types(&[DimensionKind::Time, DimensionKind::Vertical]));
    assert_eq!(
        x.data().as_f64_slice().unwrap(),
        &[15.0, 25.0, 15.0, 25.0]
    );
    product.verify().unwrap();
}

#[test]
fn test_interval_regrid_on_fixed_axis() {
    let mut product = Product::new();
    product
        .add_variable(f64_variable(
            "altitude",
            &[(DimensionKind::Vertical, 3)],
            vec![0.0, 1000.0, 2000.0],
            Some("m"),
        ))
        .unwrap();
    product
        .add_variable(f64_variable(
            "o3_column_number_density",
            &[(DimensionKind::Vertical, 3)],
            vec![1.0, 2.0, 3.0],
            Some("molec/m2"),
        ))
        .unwrap();

    let target = fixed_target(vec![500.0, 1500.0]);
    regrid_vertical_with_axis(standard_registry(), &mut product, &target).unwrap();

    // Source layers (bounds from midpoints, clamped at the surface):
    // [0,500] -> 1, [500,1500] -> 2, [1500,2500] -> 3.
    // Target layers: [0,1000] and [1000,2000].
    let column = product
        .get("o3_column_number_density")
        .unwrap()
        .data()
        .as_f64_slice()
        .unwrap();
    assert!((column[0] - 2.0).abs() < 1e-9, "got {}", column[0]);
    assert!((column[1] - 2.5).abs() < 1e-9, "got {}", column[1]);
}

fn match_product(num_time: usize, grid: &[f64], ids: Vec<i32>) -> Product {
    let nv = grid.len();
    let mut rows = Vec::new();
    for _ in 0..num_time {
        rows.extend_from_slice(grid);
    }
    let mut product = Product::new();
    product.set_source_product("B_L2");
    product
        .add_variable(f64_variable(
            "altitude",
            &[(DimensionKind::Time, num_time), (DimensionKind::Vertical, nv)],
            rows,
            Some("m"),
        ))
        .unwrap();
    product.add_variable(collocation_index_variable(ids)).unwrap();
    product
}

fn pairs_for(filename: &str, num_vertical: usize, ids: &[i64]) -> CollocationResult {
    let metadata = MatchMetadata {
        filename: filename.to_string(),
        source_product: "B_L2".to_string(),
        dimension_lengths: vec![
            (DimensionKind::Time, ids.len()),
            (DimensionKind::Vertical, num_vertical),
        ],
        datetime_start: None,
        datetime_stop: None,
    };
    CollocationResult::new(
        ids.iter()
            .enumerate()
            .map(|(i, &id)| CollocationPair {
                collocation_index: id,
                source_product_a: "A_L2".to_string(),
                index_a: i,
                index_b: i,
                metadata_b: metadata.clone(),
            })
            .collect(),
    )
}

#[test]
fn test_collocated_regrid_onto_match_grid() {
    let mut product = Product::new();
    product.set_source_product("A_L2");
    product
        .add_variable(f64_variable(
            "altitude",
            &TIME_VERTICAL,
            vec![0.0, 1000.0, 2000.0, 0.0, 1000.0, 2000.0],
            Some("m"),
        ))
        .unwrap();
    product
        .add_variable(f64_variable(
            "x",
            &TIME_VERTICAL,
            vec![10.0, 20.0, 30.0, 40.0, 50.0, 60.0],
            None,
        ))
        .unwrap();
    product
        .add_variable(collocation_index_variable(vec![0, 1]))
        .unwrap();

    let mut importer = InMemoryImporter::new();
    importer.insert("b.dat", match_product(2, &[500.0, 1500.0], vec![0, 1]));
    let collocations = pairs_for("b.dat", 2, &[0, 1]);

    regrid_vertical_with_collocated_product(
        standard_registry(),
        &mut product,
        "altitude",
        "m",
        &collocations,
        &importer,
        &[],
    )
    .unwrap();

    assert_eq!(product.dimension_length(DimensionKind::Vertical), Some(2));
    assert_eq!(
        product.get("x").unwrap().data().as_f64_slice().unwrap(),
        &[15.0, 25.0, 45.0, 55.0]
    );
    assert_eq!(
        product.get("altitude").unwrap().data().as_f64_slice().unwrap(),
        &[500.0, 1500.0, 500.0, 1500.0]
    );
    product.verify().unwrap();
}

#[test]
fn test_collocated_regrid_missing_pair_fails() {
    let mut product = Product::new();
    product.set_source_product("A_L2");
    product
        .add_variable(f64_variable(
            "altitude",
            &TIME_VERTICAL,
            vec![0.0, 1000.0, 2000.0, 0.0, 1000.0, 2000.0],
            Some("m"),
        ))
        .unwrap();
    product
        .add_variable(collocation_index_variable(vec![0, 9]))
        .unwrap();

    let mut importer = InMemoryImporter::new();
    importer.insert("b.dat", match_product(2, &[500.0, 1500.0], vec![0, 1]));
    // Only pair id 0 exists; sample 1 references id 9.
    let collocations = pairs_for("b.dat", 2, &[0]);

    let result = regrid_vertical_with_collocated_product(
        standard_registry(),
        &mut product,
        "altitude",
        "m",
        &collocations,
        &importer,
        &[],
    );
    assert!(result.is_err());
}

#[test]
fn test_collocated_smoothing_with_zero_kernel_returns_apriori() {
    let mut product = Product::new();
    product.set_source_product("A_L2");
    product
        .add_variable(f64_variable(
            "altitude",
            &TIME_VERTICAL,
            vec![0.0, 1000.0, 2000.0, 0.0, 1000.0, 2000.0],
            Some("m"),
        ))
        .unwrap();
    product
        .add_variable(f64_variable(
            "o3",
            &TIME_VERTICAL,
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
            Some("ppmv"),
        ))
        .unwrap();
    product
        .add_variable(collocation_index_variable(vec![0, 1]))
        .unwrap();

    let mut matched = match_product(2, &[500.0, 1500.0], vec![0, 1]);
    // A zero averaging kernel makes the smoothed profile the a priori.
    matched
        .add_variable(f64_variable(
            "o3_avk",
            &[
                (DimensionKind::Time, 2),
                (DimensionKind::Vertical, 2),
                (DimensionKind::Vertical, 2),
            ],
            vec![0.0; 8],
            None,
        ))
        .unwrap();
    matched
        .add_variable(f64_variable(
            "o3_apriori",
            &[(DimensionKind::Time, 2), (DimensionKind::Vertical, 2)],
            vec![7.0, 8.0, 9.0, 10.0],
            Some("ppmv"),
        ))
        .unwrap();

    let mut importer = InMemoryImporter::new();
    importer.insert("b.dat", matched);
    let collocations = pairs_for("b.dat", 2, &[0, 1]);

    regrid_vertical_with_collocated_product(
        standard_registry(),
        &mut product,
        "altitude",
        "m",
        &collocations,
        &importer,
        &["o3".to_string()],
    )
    .unwrap();

    assert_eq!(
        product.get("o3").unwrap().data().as_f64_slice().unwrap(),
        &[7.0, 8.0, 9.0, 10.0]
    );
}

#[test]
fn test_collocated_regrid_pads_shorter_columns() {
    // The match grid is longer than the product's vertical axis, so the
    // axis grows; the second sample's match column is NaN-padded.
    let mut product = Product::new();
    product.set_source_product("A_L2");
    product
        .add_variable(f64_variable(
            "altitude",
            &[(DimensionKind::Time, 1), (DimensionKind::Vertical, 2)],
            vec![0.0, 2000.0],
            Some("m"),
        ))
        .unwrap();
    product
        .add_variable(f64_variable(
            "x",
            &[(DimensionKind::Time, 1), (DimensionKind::Vertical, 2)],
            vec![0.0, 20.0],
            None,
        ))
        .unwrap();
    product
        .add_variable(collocation_index_variable(vec![0]))
        .unwrap();

    let mut importer = InMemoryImporter::new();
    importer.insert(
        "b.dat",
        match_product(1, &[0.0, 500.0, 1000.0], vec![0]),
    );
    let collocations = pairs_for("b.dat", 3, &[0]);

    regrid_vertical_with_collocated_product(
        standard_registry(),
        &mut product,
        "altitude",
        "m",
        &collocations,
        &importer,
        &[],
    )
    .unwrap();

    assert_eq!(product.dimension_length(DimensionKind::Vertical), Some(3));
    assert_eq!(
        product.get("x").unwrap().data().as_f64_slice().unwrap(),
        &[0.0, 5.0, 10.0]
    );
    product.verify().unwrap();
}
