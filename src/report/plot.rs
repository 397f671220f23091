// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Drawing a data sheet. The sheet is one PNG with three panels: the two
//! tables, the combined spectrum against a reference star, and every order
//! with its accepted region highlighted.

use std::path::Path;

use super::{metrics::TargetSummary, ReportError};
use crate::{constants::REFERENCE_PEAK_SCALE, instrument::Order, io::spectrum::TextSpectrum};

/// One order of the science target, and the part of it used in the combined
/// spectrum.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct OrderTrace {
    pub(crate) order: Order,
    pub(crate) full: TextSpectrum,
    pub(crate) accepted: TextSpectrum,
}

#[derive(Debug, Clone)]
pub(crate) struct DataSheet {
    pub(crate) science: TargetSummary,
    pub(crate) telluric: TargetSummary,

    /// The combined, flux-calibrated science spectrum.
    pub(crate) spectrum: TextSpectrum,

    /// The reference star, already scaled to the science spectrum.
    pub(crate) reference: Option<TextSpectrum>,

    /// The flux units of the science spectrum.
    pub(crate) units: String,

    pub(crate) orders: Vec<OrderTrace>,

    /// A line saying what made the sheet and when.
    pub(crate) footer: String,
}

/// Scale a reference spectrum so its peak sits just above the science peak.
pub(crate) fn scale_reference(reference: &mut TextSpectrum, science: &TextSpectrum) {
    if let (Some(sci_max), Some(ref_max)) = (science.max_flux(), reference.max_flux()) {
        if ref_max != 0.0 {
            reference.scale(REFERENCE_PEAK_SCALE * sci_max / ref_max);
        }
    }
}

/// The flux range to show the orders over: from the smallest accepted flux to
/// a little above the largest.
pub(crate) fn accepted_flux_range(orders: &[OrderTrace]) -> Option<(f64, f64)> {
    let fluxes = orders.iter().flat_map(|o| o.accepted.fluxes.iter().copied());
    let (min, max) = fluxes.fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), f| {
        (min.min(f), max.max(f))
    });
    if min.is_finite() && max.is_finite() {
        Some((min, REFERENCE_PEAK_SCALE * max))
    } else {
        None
    }
}

/// The wavelength range covered by some spectra [microns].
#[cfg_attr(not(feature = "plotting"), allow(dead_code))]
fn wavelength_range<'a, I: IntoIterator<Item = &'a TextSpectrum>>(spectra: I) -> (f64, f64) {
    let (min, max) = spectra
        .into_iter()
        .flat_map(|s| s.wavelengths.iter().copied())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), w| {
            (min.min(w), max.max(w))
        });
    nonempty_range(min / 1e4, max / 1e4)
}

/// Make sure a plotting range has some width.
#[cfg_attr(not(feature = "plotting"), allow(dead_code))]
fn nonempty_range(min: f64, max: f64) -> (f64, f64) {
    if !min.is_finite() || !max.is_finite() {
        (0.0, 1.0)
    } else if max <= min {
        (min, min + 1.0)
    } else {
        (min, max)
    }
}

#[cfg(not(feature = "plotting"))]
pub(crate) fn write_data_sheet(_sheet: &DataSheet, _output: &Path) -> Result<(), ReportError> {
    // Plotting is an optional feature, as its font dependencies can't always
    // be built.
    Err(ReportError::NoPlottingFeature)
}

#[cfg(feature = "plotting")]
pub(crate) fn write_data_sheet(sheet: &DataSheet, output: &Path) -> Result<(), ReportError> {
    drawing::draw(sheet, output)?;
    Ok(())
}

#[cfg(feature = "plotting")]
pub(crate) use drawing::DrawError;

#[cfg(feature = "plotting")]
mod drawing {
    use log::trace;
    use plotters::{coord::Shift, prelude::*};
    use thiserror::Error;

    use super::*;
    use crate::report::metrics::{CONDITIONS_LABELS, PROFILE_LABELS, UNKNOWN};

    /// The number of X pixels on a data sheet.
    const X_PIXELS: u32 = 2400;
    /// The number of Y pixels on a data sheet.
    const Y_PIXELS: u32 = 3300;
    /// Space around the tables [pixels].
    const MARGIN: i32 = 60;

    pub(super) fn draw(sheet: &DataSheet, output: &Path) -> Result<(), DrawError> {
        let root = BitMapBackend::new(output, (X_PIXELS, Y_PIXELS)).into_drawing_area();
        root.fill(&WHITE)
            .map_err(|e| DrawError::Plotters(Box::new(e)))?;
        let panels = root.split_evenly((3, 1));
        draw_tables(&panels[0], sheet)?;
        draw_spectrum(&panels[1], sheet)?;
        draw_orders(&panels[2], &sheet.orders)?;
        root.present()
            .map_err(|e| DrawError::Plotters(Box::new(e)))?;
        Ok(())
    }

    fn draw_row<DB: DrawingBackend>(
        area: &DrawingArea<DB, Shift>,
        cells: &[String],
        style: &TextStyle,
        y: i32,
    ) -> Result<(), DrawError> {
        let width = (X_PIXELS as i32 - 2 * MARGIN) / cells.len() as i32;
        for (i, cell) in cells.iter().enumerate() {
            area.draw_text(cell, style, (MARGIN + i as i32 * width, y))
                .map_err(|e| DrawError::Tables(e.to_string()))?;
        }
        Ok(())
    }

    fn draw_tables<DB: DrawingBackend>(
        area: &DrawingArea<DB, Shift>,
        sheet: &DataSheet,
    ) -> Result<(), DrawError> {
        let label_style = ("sans-serif", 34).into_font().color(&BLUE);
        let cell_style = ("sans-serif", 32).into_font().color(&BLACK);
        let first_cell = sheet.science.program_and_date();

        let profile_labels: Vec<String> = std::iter::once(first_cell.clone())
            .chain(PROFILE_LABELS.iter().map(|l| l.to_string()))
            .collect();
        let conditions_labels: Vec<String> = std::iter::once(first_cell)
            .chain(CONDITIONS_LABELS.iter().map(|l| l.to_string()))
            .collect();
        let tables = [
            (
                profile_labels,
                vec![
                    sheet.science.profile_row().to_vec(),
                    sheet.telluric.profile_row().to_vec(),
                ],
            ),
            (
                conditions_labels,
                vec![
                    sheet.science.conditions_row().to_vec(),
                    sheet.telluric.conditions_row().to_vec(),
                ],
            ),
        ];

        let mut y = MARGIN;
        for (labels, rows) in tables {
            draw_row(area, &labels, &label_style, y)?;
            y += 60;
            for row in rows {
                trace!("Table row: {row:?}");
                draw_row(area, &row, &cell_style, y)?;
                y += 50;
            }
            y += 90;
        }
        area.draw_text(
            &sheet.footer,
            &("sans-serif", 24).into_font().color(&BLACK),
            (MARGIN, y),
        )
        .map_err(|e| DrawError::Tables(e.to_string()))?;
        Ok(())
    }

    fn draw_spectrum<DB: DrawingBackend>(
        area: &DrawingArea<DB, Shift>,
        sheet: &DataSheet,
    ) -> Result<(), DrawError> {
        let spectrum = &sheet.spectrum;
        let (x_min, x_max) = wavelength_range([spectrum]);
        let (_, y_max) = nonempty_range(0.0, 1.1 * spectrum.max_flux().unwrap_or(1.0));
        let object = sheet.science.object.as_deref().unwrap_or(UNKNOWN);

        let mut cc = ChartBuilder::on(area)
            .caption(object, ("sans-serif", 44))
            .margin(40)
            .x_label_area_size(80)
            .y_label_area_size(160)
            .build_cartesian_2d(x_min..x_max, 0.0..y_max)
            .map_err(|e| DrawError::Spectrum(e.to_string()))?;
        cc.configure_mesh()
            .x_desc("Observed wavelength, um")
            .y_desc(&sheet.units)
            .label_style(("sans-serif", 28))
            .draw()
            .map_err(|e| DrawError::Spectrum(e.to_string()))?;

        cc.draw_series(LineSeries::new(
            microns(spectrum, x_min, x_max),
            BLACK.stroke_width(2),
        ))
        .map_err(|e| DrawError::Spectrum(e.to_string()))?
        .label(object)
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 30, y)], BLACK));
        if let Some(reference) = &sheet.reference {
            cc.draw_series(LineSeries::new(
                microns(reference, x_min, x_max).filter(|&(_, f)| f <= y_max),
                BLUE.stroke_width(2),
            ))
            .map_err(|e| DrawError::Spectrum(e.to_string()))?
            .label("Vega")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 30, y)], BLUE));
        }
        cc.configure_series_labels()
            .label_font(("sans-serif", 28))
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(|e| DrawError::Spectrum(e.to_string()))?;
        Ok(())
    }

    fn draw_orders<DB: DrawingBackend>(
        area: &DrawingArea<DB, Shift>,
        orders: &[OrderTrace],
    ) -> Result<(), DrawError> {
        let (x_min, x_max) = wavelength_range(orders.iter().map(|o| &o.full));
        let (y_min, y_max) = accepted_flux_range(orders).unwrap_or((0.0, 1.0));
        let (y_min, y_max) = nonempty_range(y_min, y_max);

        let mut cc = ChartBuilder::on(area)
            .caption("Orders and their accepted regions", ("sans-serif", 44))
            .margin(40)
            .x_label_area_size(80)
            .y_label_area_size(160)
            .build_cartesian_2d(x_min..x_max, y_min..y_max)
            .map_err(|e| DrawError::Orders(e.to_string()))?;
        cc.configure_mesh()
            .x_desc("Observed wavelength, um")
            .y_desc("F_lambda")
            .label_style(("sans-serif", 28))
            .draw()
            .map_err(|e| DrawError::Orders(e.to_string()))?;

        let in_view = |&(_, f): &(f64, f64)| (y_min..=y_max).contains(&f);
        for order in orders {
            trace!("Drawing order {}", order.order);
            cc.draw_series(LineSeries::new(
                microns(&order.full, x_min, x_max).filter(in_view),
                RED.stroke_width(1),
            ))
            .map_err(|e| DrawError::Orders(e.to_string()))?;
            cc.draw_series(LineSeries::new(
                microns(&order.accepted, x_min, x_max).filter(in_view),
                GREEN.stroke_width(2),
            ))
            .map_err(|e| DrawError::Orders(e.to_string()))?;
        }
        Ok(())
    }

    /// The points of a spectrum inside a wavelength range, with wavelengths
    /// in microns.
    fn microns(
        spectrum: &TextSpectrum,
        min: f64,
        max: f64,
    ) -> impl Iterator<Item = (f64, f64)> + '_ {
        spectrum
            .wavelengths
            .iter()
            .zip(spectrum.fluxes.iter())
            .map(|(&w, &f)| (w / 1e4, f))
            .filter(move |&(w, _)| (min..=max).contains(&w))
    }

    #[derive(Error, Debug)]
    pub enum DrawError {
        #[error("While drawing the tables: {0}")]
        Tables(String),

        #[error("While plotting the spectrum: {0}")]
        Spectrum(String),

        #[error("While plotting the orders: {0}")]
        Orders(String),

        #[error("Error from the plotters library: {0}")]
        Plotters(Box<dyn std::error::Error>),
    }
}
