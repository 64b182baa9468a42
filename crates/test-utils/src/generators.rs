//! Generators for synthetic products and variables.

use product_common::{ArrayData, DataType, DimensionKind, Product, Variable};

/// Build a `float64` variable with a unit from explicit values.
///
/// Panics on inconsistent shapes; test fixtures are meant to be valid.
pub fn f64_variable(
    name: &str,
    dims: &[(DimensionKind, usize)],
    values: Vec<f64>,
    unit: Option<&str>,
) -> Variable {
    let mut variable = Variable::from_f64(name, dims, values).expect("valid fixture variable");
    if let Some(unit) = unit {
        variable = variable.with_unit(unit);
    }
    variable
}

/// An `int32` `{time}` collocation-index variable.
pub fn collocation_index_variable(indices: Vec<i32>) -> Variable {
    let mut variable = Variable::new(
        "collocation_index",
        DataType::Int32,
        &[(DimensionKind::Time, indices.len())],
    )
    .expect("valid fixture variable");
    variable
        .set_data(ArrayData::Int32(indices))
        .expect("matching fixture shape");
    variable
}

/// A pressure profile descending from 1000 hPa, one row per sample.
pub fn pressure_rows(num_time: usize, num_vertical: usize) -> Vec<f64> {
    let mut values = Vec::with_capacity(num_time * num_vertical);
    for i in 0..num_time {
        for j in 0..num_vertical {
            let fraction = j as f64 / num_vertical.max(1) as f64;
            values.push((1000.0 - 10.0 * i as f64) * (1.0 - 0.9 * fraction));
        }
    }
    values
}

/// An altitude profile ascending from 500 m in 1 km steps, one row per
/// sample.
pub fn altitude_rows(num_time: usize, num_vertical: usize) -> Vec<f64> {
    let mut values = Vec::with_capacity(num_time * num_vertical);
    for i in 0..num_time {
        for j in 0..num_vertical {
            values.push(500.0 + 25.0 * i as f64 + 1000.0 * j as f64);
        }
    }
    values
}

/// A product holding the usual retrieval set: pressure, temperature,
/// altitude, a volume mixing ratio and a latitude, all on a
/// `{time, vertical}` grid.
pub fn standard_profile_product(num_time: usize, num_vertical: usize) -> Product {
    let grid = [
        (DimensionKind::Time, num_time),
        (DimensionKind::Vertical, num_vertical),
    ];
    let n = num_time * num_vertical;

    let mut product = Product::new();
    product.set_source_product("SYN_L2_20240101");
    product
        .add_variable(f64_variable(
            "pressure",
            &grid,
            pressure_rows(num_time, num_vertical),
            Some("hPa"),
        ))
        .expect("valid fixture product");
    product
        .add_variable(f64_variable(
            "temperature",
            &grid,
            (0..n).map(|i| 220.0 + (i % num_vertical.max(1)) as f64).collect(),
            Some("K"),
        ))
        .expect("valid fixture product");
    product
        .add_variable(f64_variable(
            "altitude",
            &grid,
            altitude_rows(num_time, num_vertical),
            Some("m"),
        ))
        .expect("valid fixture product");
    product
        .add_variable(f64_variable(
            "volume_mixing_ratio",
            &grid,
            (0..n).map(|i| 0.3 + 0.01 * i as f64).collect(),
            Some("ppmv"),
        ))
        .expect("valid fixture product");
    product
        .add_variable(f64_variable(
            "latitude",
            &[(DimensionKind::Time, num_time)],
            (0..num_time).map(|i| 45.0 + i as f64).collect(),
            Some("degree_north"),
        ))
        .expect("valid fixture product");
    product
}
