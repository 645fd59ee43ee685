//! Layout engine: fits a batch of images into the terminal grid.
//!
//! Arrangement convention, held constant throughout: images are stacked
//! vertically, each given the full terminal column budget. The engine only
//! computes target geometry (a column width per image); the terminal's
//! inline-image scaling does the actual pixel work downstream.

use crate::error::{PicsweepError, Result};
use crate::metrics::TerminalMetrics;
use serde::{Deserialize, Serialize};

/// Fraction of the row budget actually used, absorbing integer-rounding
/// error when pixel heights are converted to character rows.
pub const ROW_BUDGET_BUFFER: f64 = 0.98;

/// Native pixel dimensions of one image, read once when it is first laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDimensions {
    pub pixel_width: u32,
    pub pixel_height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutMode {
    /// One global scale factor for the whole batch, the largest that fits
    /// the stacked heights into the buffered row budget.
    #[default]
    Uniform,
    /// Every image gets an equal share of the row budget; its width follows
    /// from that allocation and its own aspect ratio, unless the column
    /// budget binds first.
    EqualBudget,
}

/// Render geometry for one image in the plan.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutEntry {
    /// Position of the image in the input slice.
    pub index: usize,
    /// Column width handed to the renderer. Never exceeds the terminal's
    /// column count.
    pub render_width_cols: u16,
    /// Rows this entry is expected to occupy once painted.
    pub estimated_height_rows: f64,
}

/// The scale plan for one batch against one metrics snapshot.
///
/// Invariant: the sum of `estimated_height_rows` never exceeds the
/// terminal's row count.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutPlan {
    pub mode: LayoutMode,
    pub entries: Vec<LayoutEntry>,
    pub global_scale_factor: f64,
}

fn check_metrics(metrics: &TerminalMetrics) -> Result<()> {
    if metrics.columns == 0 || metrics.rows == 0 {
        return Err(PicsweepError::degenerate(format!(
            "terminal grid {}x{}",
            metrics.columns, metrics.rows
        )));
    }
    if metrics.pixel_width == 0 || metrics.pixel_height == 0 {
        return Err(PicsweepError::degenerate(
            "terminal did not report pixel dimensions",
        ));
    }
    Ok(())
}

fn check_dimensions(dims: &[ImageDimensions]) -> Result<()> {
    for d in dims {
        if d.pixel_width == 0 || d.pixel_height == 0 {
            return Err(PicsweepError::degenerate(format!(
                "image dimensions {}x{}",
                d.pixel_width, d.pixel_height
            )));
        }
    }
    Ok(())
}

/// Rows an image occupies when rendered `width_cols` wide at its native
/// aspect ratio, rounding the pixel height up to whole rows.
fn natural_height_rows(dim: &ImageDimensions, width_cols: u16, metrics: &TerminalMetrics) -> f64 {
    let width_px = width_cols as f64 * metrics.pixels_per_col();
    let height_px = width_px * dim.pixel_height as f64 / dim.pixel_width as f64;
    (height_px / metrics.pixels_per_row()).ceil()
}

/// Computes the scale plan for `dims` under `mode`.
///
/// Fails with `DegenerateMetrics` when the terminal grid or pixel report is
/// unusable, or when any image dimension is zero.
pub fn compute_layout(
    dims: &[ImageDimensions],
    metrics: &TerminalMetrics,
    mode: LayoutMode,
) -> Result<LayoutPlan> {
    check_metrics(metrics)?;
    check_dimensions(dims)?;

    match mode {
        LayoutMode::Uniform => uniform_plan(dims, metrics),
        LayoutMode::EqualBudget => equal_budget_plan(dims, metrics),
    }
}

/// Uniform mode: every image shares one scale factor, the largest value
/// <= 1.0 such that the stacked scaled heights fit the buffered row budget.
/// Images that already fit at native aspect-fit width are not upscaled.
fn uniform_plan(dims: &[ImageDimensions], metrics: &TerminalMetrics) -> Result<LayoutPlan> {
    let width_cols = metrics.columns;
    let natural_rows: Vec<f64> = dims
        .iter()
        .map(|d| natural_height_rows(d, width_cols, metrics))
        .collect();

    let total: f64 = natural_rows.iter().sum();
    let budget = metrics.rows as f64 * ROW_BUDGET_BUFFER;
    let scale = if total > budget { budget / total } else { 1.0 };

    // A scale below one column cannot be rendered; widening to one column
    // would overflow the row budget, so fail closed instead.
    let render_width_cols = (width_cols as f64 * scale).floor();
    if render_width_cols < 1.0 {
        return Err(PicsweepError::degenerate(format!(
            "batch needs scale {:.5}, below one renderable column",
            scale
        )));
    }

    let entries = natural_rows
        .iter()
        .enumerate()
        .map(|(index, rows)| LayoutEntry {
            index,
            render_width_cols: render_width_cols as u16,
            estimated_height_rows: rows * scale,
        })
        .collect();

    Ok(LayoutPlan {
        mode: LayoutMode::Uniform,
        entries,
        global_scale_factor: scale,
    })
}

/// Equal-budget mode: each image receives `rows * buffer / count` rows
/// regardless of aspect ratio. Width follows from the allocation, except
/// when the derived width exceeds the column budget - then the image is
/// column-bound and its height shrinks below the allocation instead. The
/// binding axis is resolved per image independently.
fn equal_budget_plan(dims: &[ImageDimensions], metrics: &TerminalMetrics) -> Result<LayoutPlan> {
    let budget = metrics.rows as f64 * ROW_BUDGET_BUFFER;
    let allowance_rows = if dims.is_empty() {
        budget
    } else {
        budget / dims.len() as f64
    };
    let allowance_px = allowance_rows * metrics.pixels_per_row();

    let mut entries = Vec::with_capacity(dims.len());
    for (index, d) in dims.iter().enumerate() {
        let derived_width_px = allowance_px * d.pixel_width as f64 / d.pixel_height as f64;
        let derived_width_cols = (derived_width_px / metrics.pixels_per_col()).floor();

        // An aspect ratio so tall that even one column overshoots the row
        // allocation cannot be rendered without overflowing the terminal;
        // fail closed rather than emit an overflowing plan.
        if derived_width_cols < 1.0 {
            return Err(PicsweepError::degenerate(format!(
                "image {}x{} exceeds its row allocation at any renderable width",
                d.pixel_width, d.pixel_height
            )));
        }

        if derived_width_cols > metrics.columns as f64 {
            // Column-bound: full width, height falls below the allocation
            let width_px = metrics.columns as f64 * metrics.pixels_per_col();
            let height_px = width_px * d.pixel_height as f64 / d.pixel_width as f64;
            entries.push(LayoutEntry {
                index,
                render_width_cols: metrics.columns,
                estimated_height_rows: height_px / metrics.pixels_per_row(),
            });
        } else {
            let width_cols = derived_width_cols as u16;
            let height_px = width_cols as f64 * metrics.pixels_per_col() * d.pixel_height as f64
                / d.pixel_width as f64;
            entries.push(LayoutEntry {
                index,
                render_width_cols: width_cols,
                estimated_height_rows: height_px / metrics.pixels_per_row(),
            });
        }
    }

    Ok(LayoutPlan {
        mode: LayoutMode::EqualBudget,
        entries,
        global_scale_factor: 1.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn metrics() -> TerminalMetrics {
        TerminalMetrics {
            columns: 120,
            rows: 40,
            pixel_width: 1200,
            pixel_height: 800,
        }
    }

    fn dims(pairs: &[(u32, u32)]) -> Vec<ImageDimensions> {
        pairs
            .iter()
            .map(|&(w, h)| ImageDimensions {
                pixel_width: w,
                pixel_height: h,
            })
            .collect()
    }

    fn reference_batch() -> Vec<ImageDimensions> {
        dims(&[(4000, 3000), (1200, 1200), (3000, 1000)])
    }

    mod uniform_tests {
        use super::*;

        #[test]
        fn test_stacked_heights_fit_buffered_budget() {
            let plan = compute_layout(&reference_batch(), &metrics(), LayoutMode::Uniform).unwrap();

            let total: f64 = plan.entries.iter().map(|e| e.estimated_height_rows).sum();
            assert!(total <= 40.0 * 0.98 + EPS, "total {} exceeds budget", total);
            assert!(total <= 40.0);
        }

        #[test]
        fn test_scale_factor_shrinks_oversized_batch() {
            // Natural heights at 120 cols: 45 + 60 + 20 = 125 rows
            let plan = compute_layout(&reference_batch(), &metrics(), LayoutMode::Uniform).unwrap();

            let expected = 39.2 / 125.0;
            assert!((plan.global_scale_factor - expected).abs() < EPS);
        }

        #[test]
        fn test_no_upscaling_when_batch_already_fits() {
            // 3000x100 at 1200px wide -> 40px tall -> 2 rows each
            let plan = compute_layout(
                &dims(&[(3000, 100), (3000, 100)]),
                &metrics(),
                LayoutMode::Uniform,
            )
            .unwrap();

            assert_eq!(plan.global_scale_factor, 1.0);
            assert_eq!(plan.entries[0].render_width_cols, 120);
        }

        #[test]
        fn test_width_never_exceeds_columns() {
            let plan = compute_layout(&reference_batch(), &metrics(), LayoutMode::Uniform).unwrap();
            for entry in &plan.entries {
                assert!(entry.render_width_cols <= 120);
            }
        }

        #[test]
        fn test_unrenderable_scale_fails_closed() {
            // 1x10000 needs a scale below one column at 120 cols; widening
            // to a renderable width would overflow the terminal
            let err =
                compute_layout(&dims(&[(1, 10000)]), &metrics(), LayoutMode::Uniform).unwrap_err();
            assert!(matches!(err, PicsweepError::DegenerateMetrics { .. }));
        }

        #[test]
        fn test_single_tall_image() {
            // 1000x5000 at 120 cols: 1200px wide, 6000px tall -> 300 rows
            let plan =
                compute_layout(&dims(&[(1000, 5000)]), &metrics(), LayoutMode::Uniform).unwrap();

            let total: f64 = plan.entries.iter().map(|e| e.estimated_height_rows).sum();
            assert!(total <= 39.2 + EPS);
            assert!(plan.global_scale_factor < 1.0);
        }
    }

    mod equal_budget_tests {
        use super::*;

        #[test]
        fn test_each_image_within_allocation() {
            let plan =
                compute_layout(&reference_batch(), &metrics(), LayoutMode::EqualBudget).unwrap();

            let allowance = 39.2 / 3.0;
            for entry in &plan.entries {
                assert!(
                    entry.estimated_height_rows <= allowance + EPS,
                    "entry {} got {} rows, allowance {}",
                    entry.index,
                    entry.estimated_height_rows,
                    allowance
                );
            }
        }

        #[test]
        fn test_total_fits_row_budget() {
            let plan =
                compute_layout(&reference_batch(), &metrics(), LayoutMode::EqualBudget).unwrap();

            let total: f64 = plan.entries.iter().map(|e| e.estimated_height_rows).sum();
            assert!(total <= 40.0);
        }

        #[test]
        fn test_extreme_panorama_is_column_bound() {
            let batch = dims(&[(10000, 100), (1200, 1200), (3000, 1000)]);
            let plan = compute_layout(&batch, &metrics(), LayoutMode::EqualBudget).unwrap();

            // The panorama cannot use its full row allocation at 120 cols
            let pano = &plan.entries[0];
            assert_eq!(pano.render_width_cols, 120);
            assert!(pano.estimated_height_rows < 39.2 / 3.0);

            // The square image in the same batch stays row-bound
            let square = &plan.entries[1];
            assert!(square.render_width_cols < 120);
        }

        #[test]
        fn test_sub_column_aspect_fails_closed() {
            // At one rendered column a 1x10000 image would occupy thousands
            // of rows; no plan may be emitted for it
            let err = compute_layout(&dims(&[(1, 10000)]), &metrics(), LayoutMode::EqualBudget)
                .unwrap_err();
            assert!(matches!(err, PicsweepError::DegenerateMetrics { .. }));
        }

        #[test]
        fn test_emitted_plans_never_exceed_terminal_rows() {
            let batches = [
                dims(&[(100, 2000), (1200, 1200), (3000, 1000)]),
                dims(&[(100, 2000)]),
                dims(&[(10000, 100), (50, 900)]),
            ];
            for batch in &batches {
                let plan = compute_layout(batch, &metrics(), LayoutMode::EqualBudget).unwrap();
                let total: f64 = plan.entries.iter().map(|e| e.estimated_height_rows).sum();
                assert!(total <= 40.0, "plan exceeds terminal rows: {}", total);
            }
        }

        #[test]
        fn test_global_scale_factor_is_unity() {
            let plan =
                compute_layout(&reference_batch(), &metrics(), LayoutMode::EqualBudget).unwrap();
            assert_eq!(plan.global_scale_factor, 1.0);
        }

        #[test]
        fn test_width_never_exceeds_columns() {
            let batch = dims(&[(20000, 50)]);
            let plan = compute_layout(&batch, &metrics(), LayoutMode::EqualBudget).unwrap();
            assert!(plan.entries[0].render_width_cols <= 120);
        }
    }

    mod degenerate_tests {
        use super::*;

        #[test]
        fn test_zero_rows_is_degenerate() {
            let m = TerminalMetrics {
                rows: 0,
                ..metrics()
            };
            let err = compute_layout(&reference_batch(), &m, LayoutMode::Uniform).unwrap_err();
            assert!(matches!(err, PicsweepError::DegenerateMetrics { .. }));
        }

        #[test]
        fn test_zero_columns_is_degenerate() {
            let m = TerminalMetrics {
                columns: 0,
                ..metrics()
            };
            let err = compute_layout(&reference_batch(), &m, LayoutMode::Uniform).unwrap_err();
            assert!(matches!(err, PicsweepError::DegenerateMetrics { .. }));
        }

        #[test]
        fn test_missing_pixel_report_is_degenerate() {
            let m = TerminalMetrics {
                pixel_width: 0,
                pixel_height: 0,
                ..metrics()
            };
            let err = compute_layout(&reference_batch(), &m, LayoutMode::EqualBudget).unwrap_err();
            assert!(matches!(err, PicsweepError::DegenerateMetrics { .. }));
        }

        #[test]
        fn test_zero_image_dimension_is_degenerate() {
            let err =
                compute_layout(&dims(&[(0, 100)]), &metrics(), LayoutMode::Uniform).unwrap_err();
            assert!(matches!(err, PicsweepError::DegenerateMetrics { .. }));
        }

        #[test]
        fn test_empty_batch_is_a_valid_empty_plan() {
            let plan = compute_layout(&[], &metrics(), LayoutMode::Uniform).unwrap();
            assert!(plan.entries.is_empty());
            assert_eq!(plan.global_scale_factor, 1.0);
        }
    }
}
