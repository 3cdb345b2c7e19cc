use polars::prelude::*;
use std::path::Path;

pub fn get_data(csv: &Path) -> anyhow::Result<DataFrame> {
    Ok(CsvReader::from_path(csv)?.has_header(true).finish()?)
}

/// The columns worth showing per configuration, smallest graph first.
pub fn per_config_table(df: &DataFrame) -> anyhow::Result<DataFrame> {
    Ok(df
        .clone()
        .lazy()
        .select([
            col("n"),
            col("m"),
            col("edges"),
            col("external_time"),
            col("reference_time"),
            col("speedup"),
            col("external_memory_mb"),
            col("reference_memory_mb"),
            col("external_colors"),
            col("reference_colors"),
            col("theoretical_minimum"),
            col("valid"),
        ])
        .sort_by_exprs([col("edges"), col("n")], [false, false], false, true)
        .collect()?)
}

/// min, max, mean and geomean of the speedup over all configurations.
pub fn speedup_summary(df: &DataFrame) -> anyhow::Result<DataFrame> {
    Ok(df
        .clone()
        .lazy()
        .select([
            len().alias("configs"),
            col("speedup").min().alias("min"),
            col("speedup").max().alias("max"),
            col("speedup").mean().alias("mean"),
            col("speedup")
                .product()
                .pow(lit(1.0f64) / len())
                .alias("geomean"),
        ])
        .collect()?)
}

/// Mean number of colors above the max-degree lower bound, per implementation.
pub fn color_excess_summary(df: &DataFrame) -> anyhow::Result<DataFrame> {
    Ok(df
        .clone()
        .lazy()
        .select([
            (col("external_colors") - col("theoretical_minimum"))
                .mean()
                .alias("external"),
            (col("reference_colors") - col("theoretical_minimum"))
                .mean()
                .alias("reference"),
        ])
        .collect()?)
}

pub fn count_invalid(df: &DataFrame) -> anyhow::Result<usize> {
    Ok(df
        .column("valid")?
        .bool()?
        .into_iter()
        .filter(|v| *v == Some(false))
        .count())
}
