//! # Despiece CLI Application
//!
//! Terminal demo driver for the detailing engine: builds a two-span beam
//! from a few prompts, runs the full pipeline and prints the resulting
//! segments, splices, stirrup zones and warnings, plus the JSON payload the
//! drawing exporters consume.

use std::io::{self, BufRead, Write};

use detail_core::detailing::bar::{Bar, BarPosition, Continuity};
use detail_core::detailing::{detail_beam, DetailingInput};
use detail_core::geometry::{BeamGeometry, ProhibitedZone, Support};
use detail_core::layout::{layout_position, LayoutConfig};
use detail_core::nsr10::{lap_splice_length, BarMark, DissipationClass, HookAngle};
use detail_core::project::CuttingSummary;
use detail_core::stirrups::plan_stirrups;

fn prompt_f64(prompt: &str, default: f64) -> f64 {
    print!("{}", prompt);
    if io::stdout().flush().is_err() {
        return default;
    }

    let mut input = String::new();
    if io::stdin().lock().read_line(&mut input).is_err() {
        return default;
    }

    input.trim().parse().unwrap_or(default)
}

fn prompt_class(prompt: &str) -> DissipationClass {
    print!("{}", prompt);
    if io::stdout().flush().is_err() {
        return DissipationClass::Des;
    }

    let mut input = String::new();
    if io::stdin().lock().read_line(&mut input).is_err() {
        return DissipationClass::Des;
    }

    match input.trim().to_uppercase().as_str() {
        "DMO" => DissipationClass::Dmo,
        "DMI" => DissipationClass::Dmi,
        _ => DissipationClass::Des,
    }
}

fn main() {
    println!("Despiece CLI - NSR-10 Beam Reinforcement Detailing");
    println!("==================================================");
    println!();

    let clear_span_m = prompt_f64("Enter clear span per bay (m) [6.5]: ", 6.5);
    let class = prompt_class("Enter dissipation class DES/DMO/DMI [DES]: ");
    let commercial_length_m = prompt_f64("Enter commercial bar length (m) [12.0]: ", 12.0);

    println!();
    println!("Detailing a two-bay beam with #6 continuous steel...");
    println!();

    let support_width_m = 0.35;
    let supports = vec![
        Support { index: 0, label: "A".to_string(), start_m: 0.0, width_m: support_width_m },
        Support {
            index: 1,
            label: "B".to_string(),
            start_m: support_width_m + clear_span_m,
            width_m: support_width_m,
        },
        Support {
            index: 2,
            label: "C".to_string(),
            start_m: 2.0 * (support_width_m + clear_span_m),
            width_m: support_width_m,
        },
    ];
    let geometry = match BeamGeometry::from_supports(supports, 0.30, 0.45) {
        Ok(geometry) => geometry,
        Err(e) => {
            eprintln!("Error: {}", e);
            return;
        }
    };
    let beam_length_m = geometry.total_length_m;

    // The rule evaluator would produce these; approximate them here as the
    // midspan exclusion of each bay for bottom steel coordination
    let prohibited_zones: Vec<ProhibitedZone> = geometry
        .spans
        .iter()
        .map(|span| {
            let center = (span.start_m + span.end_m) / 2.0;
            ProhibitedZone::new(
                center - span.clear_length_m() / 6.0,
                center + span.clear_length_m() / 6.0,
                format!("Midspan exclusion, before support {}", span.index + 1),
            )
        })
        .collect();

    let mark = BarMark::No6;
    let splice_length_m = lap_splice_length(mark.diameter_mm(), class, commercial_length_m);

    let bar = |id: &str, position: BarPosition| Bar {
        id: id.to_string(),
        mark,
        position,
        continuity: Continuity::Continuous,
        start_m: 0.0,
        end_m: beam_length_m,
        hook: Some(HookAngle::Deg90),
        quantity: 2,
        development_length_m: class.development_base() * mark.diameter_mm() / 1000.0,
        notes: None,
    };

    let input = DetailingInput {
        beam_length_m,
        class,
        commercial_length_m,
        splice_length_m,
        cover_m: 0.04,
        splice_offset_ratio: 0.0,
        prefer_previous_zone: true,
        top_bars: vec![bar("T6-C01", BarPosition::Top)],
        bottom_bars: vec![bar("B6-C01", BarPosition::Bottom)],
        prohibited_zones,
    };

    match detail_beam(&input) {
        Ok(outcome) => {
            let summary = CuttingSummary::from_outcome(&outcome);
            let stirrups = plan_stirrups(&geometry, class, BarMark::No3);

            println!("═══════════════════════════════════════");
            println!("  DETAILING RESULTS");
            println!("═══════════════════════════════════════");
            println!();
            println!("Input:");
            println!("  Beam length:  {:.2} m", beam_length_m);
            println!("  Class:        {}", class);
            println!("  Stock length: {:.1} m", commercial_length_m);
            println!("  Lap splice:   {:.3} m", splice_length_m);
            println!();

            for position in BarPosition::ALL {
                println!("{} segments:", position);
                for segment in outcome.segments(position) {
                    println!(
                        "  {}  [{:.2}, {:.2}] m  L={:.2} m",
                        segment.id,
                        segment.start_m,
                        segment.end_m,
                        segment.length_m()
                    );
                    for splice in &segment.splices {
                        let marker = if splice.adjusted { " (moved)" } else { "" };
                        println!(
                            "      splice [{:.2}, {:.2}] m{}",
                            splice.start_m, splice.end_m, marker
                        );
                    }
                }
            }
            println!();

            println!("Stirrup zones ({}):", class.confinement_reference());
            for zone in &stirrups.zones {
                println!(
                    "  [{:.2}, {:.2}] m  {}",
                    zone.start_m, zone.end_m, zone.label
                );
            }
            println!();

            let layout = layout_position(
                &outcome.top_segments,
                BarPosition::Top,
                &geometry,
                &LayoutConfig::default(),
            );
            println!("Top layout: {} groups in {} lanes", layout.groups.len(), layout.lane_count);
            println!();

            println!("Summary:");
            println!("  Pieces:      {} top / {} bottom", summary.top_piece_count, summary.bottom_piece_count);
            println!("  Splices:     {}", summary.splice_count);
            println!("  Total steel: {:.2} m", summary.total_steel_length_m);
            println!();

            if outcome.diagnostics.is_empty() {
                println!("No warnings.");
            } else {
                println!("Warnings:");
                for warning in &outcome.diagnostics {
                    println!("  {}", warning);
                }
            }

            println!();
            println!("JSON Output (for exporters/API use):");
            if let Ok(json) = serde_json::to_string_pretty(&outcome) {
                println!("{}", json);
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            if let Ok(json) = serde_json::to_string_pretty(&e) {
                eprintln!();
                eprintln!("Error JSON:");
                eprintln!("{}", json);
            }
        }
    }
}
