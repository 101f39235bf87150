use std::ops::Range;

use eyre::Result;
use plotters::{
    prelude::*,
    style::{
        text_anchor::{HPos, Pos, VPos},
        FontTransform,
    },
};
use time::{macros::format_description, OffsetDateTime};

use super::{CategorizedChart, CumulativeChart, RaceChart};

const SIZE: (u32, u32) = (1280, 720);
const DAY_SECS: f64 = 86_400.0;

const LABEL_FONT_SIZE: u32 = 14;
/// Rough width of a single character in the label font
const LABEL_CHAR_WIDTH: u32 = 8;
const LABEL_AREA: Range<u32> = 50..300;

pub fn cumulative(chart: &CumulativeChart) -> Result<String> {
    let mut svg = String::new();

    {
        let root = SVGBackend::with_string(&mut svg, SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        let timestamps = chart
            .series
            .iter()
            .flat_map(|(_, points)| points.iter().map(|&(timestamp, _)| timestamp));

        let y_max = chart
            .series
            .iter()
            .filter_map(|(_, points)| points.last())
            .map(|&(_, total)| total)
            .max()
            .unwrap_or(0)
            .max(1) as f64;

        let mut ctx = ChartBuilder::on(&root)
            .caption("Cumulative trophy points", ("sans-serif", 28))
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(90)
            .build_cartesian_2d(time_range(timestamps), 0.0..y_max * 1.05)?;

        ctx.configure_mesh()
            .x_label_formatter(&format_date)
            .y_label_formatter(&|points| format!("{points:.0}"))
            .y_desc("Trophy points")
            .draw()?;

        for ((name, points), idx) in chart.series.iter().zip(0..) {
            let color = Palette99::pick(idx).mix(0.9);

            let line = points
                .iter()
                .map(|&(timestamp, total)| (unix_secs(timestamp), total as f64));

            ctx.draw_series(LineSeries::new(line, color.stroke_width(2)))?
                .label(name.as_str())
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
                });
        }

        ctx.configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;

        root.present()?;
    }

    Ok(svg)
}

pub fn race(chart: &RaceChart) -> Result<String> {
    let mut svg = String::new();

    {
        let root = SVGBackend::with_string(&mut svg, SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        let [left, right] = &chart.players;
        let timestamps = chart.deltas.iter().map(|&(timestamp, _)| timestamp);

        let (y_min, y_max) = chart
            .deltas
            .iter()
            .fold((0, 0), |(min, max), &(_, delta)| (min.min(delta), max.max(delta)));

        let padding = ((y_max - y_min) as f64 * 0.05).max(1.0);
        let x_range = time_range(timestamps);
        let baseline = [(x_range.start, 0.0), (x_range.end, 0.0)];

        let mut ctx = ChartBuilder::on(&root)
            .caption(format!("{left} vs {right}"), ("sans-serif", 28))
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(90)
            .build_cartesian_2d(x_range, (y_min as f64 - padding)..(y_max as f64 + padding))?;

        ctx.configure_mesh()
            .x_label_formatter(&format_date)
            .y_label_formatter(&|delta| format!("{delta:.0}"))
            .y_desc(format!("{left} trophies minus {right} trophies"))
            .draw()?;

        ctx.draw_series(LineSeries::new(baseline, BLACK.mix(0.4)))?;

        let line = chart
            .deltas
            .iter()
            .map(|&(timestamp, delta)| (unix_secs(timestamp), delta as f64));

        ctx.draw_series(LineSeries::new(line, Palette99::pick(0).stroke_width(2)))?;

        root.present()?;
    }

    Ok(svg)
}

pub fn categorized(chart: &CategorizedChart) -> Result<String> {
    let mut svg = String::new();

    {
        let root = SVGBackend::with_string(&mut svg, SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        let category_count = chart.categories.len().max(1) as f64;

        let y_max = chart
            .bars
            .iter()
            .flat_map(|(_, totals)| totals.iter().copied())
            .max()
            .unwrap_or(0)
            .max(1) as f64;

        let start = chart
            .start
            .format(format_description!("[year]-[month]-[day]"))?;

        let mut ctx = ChartBuilder::on(&root)
            .caption(format!("Trophy points since {start}"), ("sans-serif", 28))
            .margin(20)
            .x_label_area_size(category_label_area(&chart.categories))
            .y_label_area_size(90)
            .build_cartesian_2d(0.0..category_count, 0.0..y_max * 1.1)?;

        ctx.configure_mesh()
            .disable_x_mesh()
            .x_label_formatter(&|_| String::new())
            .y_label_formatter(&|points| format!("{points:.0}"))
            .y_desc("Trophy points")
            .draw()?;

        let group_width = 0.8;
        let bar_width = group_width / chart.bars.len().max(1) as f64;

        for ((name, totals), idx) in chart.bars.iter().zip(0..) {
            let color = Palette99::pick(idx).mix(0.9);
            let offset = (1.0 - group_width) / 2.0 + idx as f64 * bar_width;

            let bars = totals.iter().zip(0..).map(|(&total, category)| {
                let x = category as f64 + offset;

                Rectangle::new([(x, 0.0), (x + bar_width, total as f64)], color.filled())
            });

            ctx.draw_series(bars)?
                .label(name.as_str())
                .legend(move |(x, y)| {
                    Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled())
                });
        }

        ctx.configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;

        // rotated so that long categories don't overlap their neighbours
        let label_style = TextStyle::from(("sans-serif", LABEL_FONT_SIZE).into_font())
            .transform(FontTransform::Rotate90)
            .pos(Pos::new(HPos::Left, VPos::Center));

        for (category, idx) in chart.categories.iter().zip(0..) {
            let (x, y) = ctx.backend_coord(&(idx as f64 + 0.5, 0.0));
            root.draw_text(category, &label_style, (x, y + 8))?;
        }

        root.present()?;
    }

    Ok(svg)
}

/// Height below the x axis fitting the longest rotated category label.
fn category_label_area(categories: &[String]) -> u32 {
    let longest = categories
        .iter()
        .map(|category| category.chars().count())
        .max()
        .unwrap_or(0);

    let height = u32::try_from(longest)
        .unwrap_or(u32::MAX)
        .saturating_mul(LABEL_CHAR_WIDTH)
        .saturating_add(20);

    height.clamp(LABEL_AREA.start, LABEL_AREA.end)
}

fn unix_secs(timestamp: OffsetDateTime) -> f64 {
    timestamp.unix_timestamp() as f64
}

/// Range covering all timestamps, at least one day wide on each side
/// if there is only a single point in time.
fn time_range(timestamps: impl Iterator<Item = OffsetDateTime>) -> Range<f64> {
    let bounds = timestamps.map(unix_secs).fold(None, |bounds, secs| match bounds {
        None => Some((secs, secs)),
        Some((min, max)) => Some((f64::min(min, secs), f64::max(max, secs))),
    });

    match bounds {
        Some((min, max)) if min < max => min..max,
        Some((secs, _)) => secs - DAY_SECS..secs + DAY_SECS,
        None => {
            let now = unix_secs(OffsetDateTime::now_utc());

            now - DAY_SECS..now + DAY_SECS
        }
    }
}

fn format_date(secs: &f64) -> String {
    OffsetDateTime::from_unix_timestamp(*secs as i64)
        .ok()
        .and_then(|datetime| {
            datetime
                .format(format_description!("[year]-[month]-[day]"))
                .ok()
        })
        .unwrap_or_default()
}
