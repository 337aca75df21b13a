//! # Drawing Layout / Lane Assignment
//!
//! Turns one position's segment set into renderable groups: parallel
//! identical pieces merge into one drawn group with a combined quantity,
//! groups get non-overlapping vertical lanes by greedy interval coloring,
//! and pieces split from one bar fan out in a compact sub-stack within
//! their family's lane.
//!
//! Output is pure data ([`PositionLayout`]); the SVG/DXF/PDF collaborator
//! consumes it as plain geometric primitives. Offsets are expressed in
//! abstract drawing units via [`LayoutConfig`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::detailing::bar::{BarPosition, Segment};
use crate::geometry::BeamGeometry;
use crate::nsr10::HookAngle;

/// Lane-scan tolerance along the beam axis (m)
const TOLERANCE: f64 = 1e-3;

/// Spacing knobs in drawing units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Vertical distance between unrelated families' lanes
    pub lane_spacing: f64,

    /// Vertical distance between stacked members of one family
    pub family_spacing: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            lane_spacing: 320.0,
            family_spacing: 90.0,
        }
    }
}

impl LayoutConfig {
    /// Bounded vertical amplitude for hook strokes, keeping them clear of
    /// the adjacent lane
    pub fn hook_amplitude(&self) -> f64 {
        let clearance = self.lane_spacing - self.family_spacing;
        (clearance * 0.4).min(80.0)
    }
}

/// A hook to draw at one end of a group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HookMarker {
    /// Bend angle
    pub angle: HookAngle,

    /// Hook extension in meters, from the bar-mark table
    pub length_m: f64,
}

/// One drawn group: identical parallel segments coalesced, with lane and
/// stack placement resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentGroup {
    /// Representative segment id
    pub segment_id: String,

    /// Family the group stacks with
    pub family_id: String,

    /// Commercial bar mark
    pub mark: crate::nsr10::BarMark,

    /// Left end (m)
    pub start_m: f64,

    /// Right end (m)
    pub end_m: f64,

    /// Combined count of identical parallel pieces
    pub quantity: u32,

    /// Coarse lane index (0-based, increasing away from the reference line)
    pub lane: usize,

    /// Sub-stack index within the family
    pub stack: usize,

    /// Lowest lane occupied by this group's family
    pub family_base_lane: usize,

    /// Vertical offset from the reference line, in drawing units
    pub offset: f64,

    /// Hook to draw at the group's start, when warranted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_hook: Option<HookMarker>,

    /// Hook to draw at the group's end, when warranted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_hook: Option<HookMarker>,

    /// Drawing label, e.g. `2Φ#5 L=7.50m`
    pub label: String,
}

impl SegmentGroup {
    /// Group length (m)
    pub fn length_m(&self) -> f64 {
        self.end_m - self.start_m
    }
}

/// Layout of one reinforcement position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionLayout {
    /// Which face this layout belongs to
    pub position: BarPosition,

    /// Drawn groups with resolved placement
    pub groups: Vec<SegmentGroup>,

    /// Number of lanes in use
    pub lane_count: usize,

    /// Vertical amplitude cap for hook strokes, in drawing units
    pub hook_amplitude: f64,
}

/// Compute the layout for one position's segments.
pub fn layout_position(
    segments: &[Segment],
    position: BarPosition,
    geometry: &BeamGeometry,
    config: &LayoutConfig,
) -> PositionLayout {
    let merged = merge_parallel_segments(segments, position);
    let lanes = assign_lanes(&merged);
    let stacks = assign_family_stacks(&merged);

    let mut family_base_lane: HashMap<&str, usize> = HashMap::new();
    for (index, group) in merged.iter().enumerate() {
        let lane = lanes[index];
        family_base_lane
            .entry(group.family_id.as_str())
            .and_modify(|base| *base = (*base).min(lane))
            .or_insert(lane);
    }

    let terminals = family_terminals(&merged);

    let mut groups: Vec<SegmentGroup> = Vec::with_capacity(merged.len());
    for (index, group) in merged.iter().enumerate() {
        let lane = lanes[index];
        let family_base = family_base_lane[group.family_id.as_str()];
        let stack = stacks
            .get(&index)
            .copied()
            .unwrap_or_else(|| lane.saturating_sub(family_base));
        let offset = config.lane_spacing * family_base as f64 + config.family_spacing * stack as f64;

        let family = &terminals[group.family_id.as_str()];
        let start_hook = hook_marker(group, geometry, HookEnd::Start, family.start == index);
        let end_hook = hook_marker(group, geometry, HookEnd::End, family.end == index);

        groups.push(SegmentGroup {
            segment_id: group.segment.id.clone(),
            family_id: group.family_id.clone(),
            mark: group.segment.mark,
            start_m: group.start_m,
            end_m: group.end_m,
            quantity: group.quantity,
            lane,
            stack,
            family_base_lane: family_base,
            offset,
            start_hook,
            end_hook,
            label: format!(
                "{}Φ{} L={:.2}m",
                group.quantity,
                group.segment.mark,
                group.end_m - group.start_m
            ),
        });
    }

    let lane_count = lanes.iter().max().map(|max| max + 1).unwrap_or(0);

    PositionLayout {
        position,
        groups,
        lane_count,
        hook_amplitude: config.hook_amplitude(),
    }
}

/// Working group before placement.
struct MergedGroup<'a> {
    segment: &'a Segment,
    family_id: String,
    start_m: f64,
    end_m: f64,
    quantity: u32,
}

/// Exact-match merge key: mark, rounded coordinates and length, hook type.
fn merge_key(segment: &Segment) -> (crate::nsr10::BarMark, i64, i64, i64, Option<HookAngle>) {
    let round4 = |value: f64| (value * 1e4).round() as i64;
    (
        segment.mark,
        round4(segment.start_m),
        round4(segment.end_m),
        round4(segment.length_m()),
        segment.hook,
    )
}

/// Coalesce identical parallel pieces into one group with a combined
/// quantity, sorted by `(start, end)`.
fn merge_parallel_segments(segments: &[Segment], position: BarPosition) -> Vec<MergedGroup<'_>> {
    let mut order: Vec<(crate::nsr10::BarMark, i64, i64, i64, Option<HookAngle>)> = Vec::new();
    let mut grouped: HashMap<_, MergedGroup<'_>> = HashMap::new();

    for segment in segments {
        if segment.position != position {
            continue;
        }
        let (start_m, end_m) = if segment.end_m < segment.start_m {
            (segment.end_m, segment.start_m)
        } else {
            (segment.start_m, segment.end_m)
        };

        let key = merge_key(segment);
        match grouped.get_mut(&key) {
            Some(existing) => existing.quantity += segment.quantity.max(1),
            None => {
                order.push(key);
                grouped.insert(
                    key,
                    MergedGroup {
                        segment,
                        family_id: segment.family_id().to_string(),
                        start_m,
                        end_m,
                        quantity: segment.quantity.max(1),
                    },
                );
            }
        }
    }

    let mut merged: Vec<MergedGroup<'_>> = order
        .into_iter()
        .filter_map(|key| grouped.remove(&key))
        .collect();
    merged.sort_by(|a, b| a.start_m.total_cmp(&b.start_m).then(a.end_m.total_cmp(&b.end_m)));
    merged
}

/// Greedy interval coloring: each group takes the first lane whose current
/// end clears the group's start, opening a new lane otherwise. Guarantees
/// no two groups sharing a lane overlap along the axis.
fn assign_lanes(groups: &[MergedGroup<'_>]) -> Vec<usize> {
    let mut assignments = vec![0usize; groups.len()];
    let mut lane_ends: Vec<f64> = Vec::new();

    // Groups are already sorted by (start, end)
    for (index, group) in groups.iter().enumerate() {
        let mut lane = None;
        for (lane_index, lane_end) in lane_ends.iter_mut().enumerate() {
            if group.start_m >= *lane_end - TOLERANCE {
                *lane_end = group.end_m;
                lane = Some(lane_index);
                break;
            }
        }
        assignments[index] = match lane {
            Some(lane_index) => lane_index,
            None => {
                lane_ends.push(group.end_m);
                lane_ends.len() - 1
            }
        };
    }

    assignments
}

/// Re-run the greedy coloring inside each multi-member family and record
/// each member's stack offset relative to the family's lowest lane.
fn assign_family_stacks(groups: &[MergedGroup<'_>]) -> HashMap<usize, usize> {
    let mut families: HashMap<&str, Vec<usize>> = HashMap::new();
    for (index, group) in groups.iter().enumerate() {
        families.entry(group.family_id.as_str()).or_default().push(index);
    }

    let mut stacks: HashMap<usize, usize> = HashMap::new();
    for members in families.values() {
        if members.len() <= 1 {
            continue;
        }

        let family_groups: Vec<&MergedGroup<'_>> = members.iter().map(|&i| &groups[i]).collect();
        let mut lane_ends: Vec<f64> = Vec::new();
        let mut family_lanes = vec![0usize; family_groups.len()];
        for (local, group) in family_groups.iter().enumerate() {
            let mut lane = None;
            for (lane_index, lane_end) in lane_ends.iter_mut().enumerate() {
                if group.start_m >= *lane_end - TOLERANCE {
                    *lane_end = group.end_m;
                    lane = Some(lane_index);
                    break;
                }
            }
            family_lanes[local] = match lane {
                Some(lane_index) => lane_index,
                None => {
                    lane_ends.push(group.end_m);
                    lane_ends.len() - 1
                }
            };
        }

        let min_lane = family_lanes.iter().copied().min().unwrap_or(0);
        for (local, &index) in members.iter().enumerate() {
            stacks.insert(index, family_lanes[local] - min_lane);
        }
    }

    stacks
}

struct FamilyTerminals {
    /// Index of the member holding the family's leftmost start
    start: usize,
    /// Index of the member holding the family's rightmost end
    end: usize,
}

fn family_terminals<'a>(groups: &'a [MergedGroup<'a>]) -> HashMap<&'a str, FamilyTerminals> {
    let mut terminals: HashMap<&str, FamilyTerminals> = HashMap::new();
    for (index, group) in groups.iter().enumerate() {
        terminals
            .entry(group.family_id.as_str())
            .and_modify(|family| {
                if group.start_m < groups[family.start].start_m {
                    family.start = index;
                }
                if group.end_m > groups[family.end].end_m {
                    family.end = index;
                }
            })
            .or_insert(FamilyTerminals {
                start: index,
                end: index,
            });
    }
    terminals
}

#[derive(Clone, Copy, PartialEq)]
enum HookEnd {
    Start,
    End,
}

/// Hook to draw at one end of a group, or `None` when the end is an
/// internal splice boundary, the bar is unhooked, the mark/angle combination
/// is undefined, or the end is neither near a support nor forced by a note.
fn hook_marker(
    group: &MergedGroup<'_>,
    geometry: &BeamGeometry,
    end: HookEnd,
    is_family_terminal: bool,
) -> Option<HookMarker> {
    if !is_family_terminal {
        return None;
    }
    let angle = group.segment.hook?;

    let coordinate = match end {
        HookEnd::Start => group.start_m,
        HookEnd::End => group.end_m,
    };
    let warranted =
        is_near_support(coordinate, geometry, end) || notes_force_hook(group.segment, end);
    if !warranted {
        return None;
    }

    let length_m = group.segment.mark.hook_length(angle)?;
    if length_m <= 0.0 {
        return None;
    }

    Some(HookMarker { angle, length_m })
}

/// Support-proximity threshold: 1.2× the nearest support width, clamped to
/// [0.25, 0.6] m; 0.45 m when no supports are defined.
fn support_threshold_m(geometry: &BeamGeometry, end: HookEnd) -> f64 {
    let support = match end {
        HookEnd::Start => geometry.supports.first(),
        HookEnd::End => geometry.supports.last(),
    };
    match support {
        Some(support) => (support.width_m * 1.2).clamp(0.25, 0.6),
        None => 0.45,
    }
}

fn is_near_support(coordinate_m: f64, geometry: &BeamGeometry, end: HookEnd) -> bool {
    let threshold = support_threshold_m(geometry, end);
    match end {
        HookEnd::Start => coordinate_m <= threshold,
        HookEnd::End => geometry.total_length_m - coordinate_m <= threshold,
    }
}

/// Notes can force a hook regardless of geometry: the note must mention a
/// support ("support"/"apoyo") plus a directional token for the end.
fn notes_force_hook(segment: &Segment, end: HookEnd) -> bool {
    let Some(note) = &segment.notes else {
        return false;
    };
    let note = note.to_lowercase();
    if !note.contains("apoyo") && !note.contains("support") {
        return false;
    }
    let tokens: &[&str] = match end {
        HookEnd::Start => &["izq", "izquier", "inicio", "left", "start"],
        HookEnd::End => &["der", "derech", "final", "right", "end"],
    };
    tokens.iter().any(|token| note.contains(token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detailing::bar::{Bar, Continuity};
    use crate::geometry::Support;
    use crate::nsr10::BarMark;

    fn geometry() -> BeamGeometry {
        BeamGeometry::from_supports(
            vec![
                Support {
                    index: 0,
                    label: "A".to_string(),
                    start_m: 0.0,
                    width_m: 0.35,
                },
                Support {
                    index: 1,
                    label: "B".to_string(),
                    start_m: 8.70,
                    width_m: 0.35,
                },
            ],
            0.30,
            0.45,
        )
        .unwrap()
    }

    fn segment(id: &str, start_m: f64, end_m: f64, quantity: u32) -> Segment {
        let parent = Bar {
            id: id.to_string(),
            mark: BarMark::No5,
            position: BarPosition::Top,
            continuity: Continuity::Continuous,
            start_m,
            end_m,
            hook: None,
            quantity,
            development_length_m: 0.6,
            notes: None,
        };
        Segment::from_unsplit_bar(&parent)
    }

    #[test]
    fn test_identical_parallel_segments_merge() {
        let segments = vec![
            segment("T1", 0.0, 9.05, 2),
            segment("T2", 0.0, 9.05, 2),
            segment("T3", 0.0, 4.0, 1),
        ];
        let layout = layout_position(&segments, BarPosition::Top, &geometry(), &LayoutConfig::default());

        assert_eq!(layout.groups.len(), 2);
        let merged = layout
            .groups
            .iter()
            .find(|group| (group.end_m - 9.05).abs() < 1e-9)
            .unwrap();
        assert_eq!(merged.quantity, 4);
    }

    #[test]
    fn test_lane_non_overlap_invariant() {
        let segments = vec![
            segment("A1", 0.0, 5.0, 1),
            segment("A2", 4.0, 9.05, 1),
            segment("A3", 5.5, 9.05, 1),
            segment("A4", 0.0, 3.0, 1),
        ];
        let layout = layout_position(&segments, BarPosition::Top, &geometry(), &LayoutConfig::default());

        for a in &layout.groups {
            for b in &layout.groups {
                if a.segment_id != b.segment_id && a.lane == b.lane {
                    let overlap = a.start_m.max(b.start_m) < a.end_m.min(b.end_m) - TOLERANCE;
                    assert!(!overlap, "{} and {} overlap in lane {}", a.segment_id, b.segment_id, a.lane);
                }
            }
        }
    }

    #[test]
    fn test_disjoint_groups_share_first_lane() {
        let segments = vec![segment("A1", 0.0, 4.0, 1), segment("A2", 4.5, 9.05, 1)];
        let layout = layout_position(&segments, BarPosition::Top, &geometry(), &LayoutConfig::default());

        assert_eq!(layout.lane_count, 1);
        assert!(layout.groups.iter().all(|group| group.lane == 0));
    }

    #[test]
    fn test_family_stack_fans_out_compactly() {
        // Two pieces of one bar overlap in their splice region, plus one
        // unrelated full-length bar
        let segments = vec![
            segment("T1-S01", 0.0, 5.4, 1),
            segment("T1-S02", 4.5, 9.05, 1),
            segment("T2", 0.0, 9.05, 1),
        ];
        let config = LayoutConfig::default();
        let layout = layout_position(&segments, BarPosition::Top, &geometry(), &config);

        let s01 = layout.groups.iter().find(|g| g.segment_id == "T1-S01").unwrap();
        let s02 = layout.groups.iter().find(|g| g.segment_id == "T1-S02").unwrap();

        // Same family: one fans out by family spacing, not a full lane
        assert_eq!(s01.family_base_lane, s02.family_base_lane);
        assert_eq!(s01.stack, 0);
        assert_eq!(s02.stack, 1);
        assert!((s02.offset - s01.offset - config.family_spacing).abs() < 1e-9);
    }

    #[test]
    fn test_hooks_only_at_family_terminals_near_supports() {
        let mut near = segment("T1-S01", 0.1, 5.4, 1);
        near.hook = Some(HookAngle::Deg90);
        let mut far = segment("T1-S02", 4.5, 6.0, 1);
        far.hook = Some(HookAngle::Deg90);

        let layout = layout_position(&[near, far], BarPosition::Top, &geometry(), &LayoutConfig::default());

        let s01 = layout.groups.iter().find(|g| g.segment_id == "T1-S01").unwrap();
        let s02 = layout.groups.iter().find(|g| g.segment_id == "T1-S02").unwrap();

        // Start terminal near support A: hook drawn with the #5/90° length
        let marker = s01.start_hook.expect("start hook expected");
        assert!((marker.length_m - 0.25).abs() < 1e-9);
        // Internal splice boundary: no hook
        assert!(s01.end_hook.is_none());
        assert!(s02.start_hook.is_none());
        // Family end terminal, but 6.0 is far from support B's threshold
        assert!(s02.end_hook.is_none());
    }

    #[test]
    fn test_undefined_hook_combination_silently_skipped() {
        let mut hooked = segment("T9", 0.1, 9.0, 1);
        hooked.mark = BarMark::No9;
        hooked.hook = Some(HookAngle::Deg135);

        let layout = layout_position(&[hooked], BarPosition::Top, &geometry(), &LayoutConfig::default());
        assert!(layout.groups[0].start_hook.is_none());
    }

    #[test]
    fn test_notes_force_hook_regardless_of_geometry() {
        let mut noted = segment("T1", 2.0, 7.0, 1);
        noted.hook = Some(HookAngle::Deg135);
        noted.notes = Some("Gancho en apoyo izquierdo".to_string());

        let layout = layout_position(&[noted], BarPosition::Top, &geometry(), &LayoutConfig::default());
        let group = &layout.groups[0];
        assert!(group.start_hook.is_some());
        assert!(group.end_hook.is_none());
    }

    #[test]
    fn test_support_threshold_clamping() {
        let wide = BeamGeometry::from_supports(
            vec![
                Support { index: 0, label: "A".to_string(), start_m: 0.0, width_m: 0.8 },
                Support { index: 1, label: "B".to_string(), start_m: 9.0, width_m: 0.8 },
            ],
            0.30,
            0.45,
        )
        .unwrap();
        // 0.8 × 1.2 = 0.96 clamps to 0.6
        assert!((support_threshold_m(&wide, HookEnd::Start) - 0.6).abs() < 1e-9);

        let narrow = BeamGeometry::from_supports(
            vec![
                Support { index: 0, label: "A".to_string(), start_m: 0.0, width_m: 0.15 },
                Support { index: 1, label: "B".to_string(), start_m: 9.0, width_m: 0.15 },
            ],
            0.30,
            0.45,
        )
        .unwrap();
        // 0.15 × 1.2 = 0.18 clamps to 0.25
        assert!((support_threshold_m(&narrow, HookEnd::Start) - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_label_format() {
        let segments = vec![segment("T1", 0.0, 7.5, 2)];
        let layout = layout_position(&segments, BarPosition::Top, &geometry(), &LayoutConfig::default());
        assert_eq!(layout.groups[0].label, "2Φ#5 L=7.50m");
        assert!((layout.groups[0].length_m() - 7.5).abs() < 1e-9);
    }

    #[test]
    fn test_hook_amplitude_is_bounded() {
        let config = LayoutConfig::default();
        // min((320 - 90) × 0.4, 80) = 80
        assert!((config.hook_amplitude() - 80.0).abs() < 1e-9);

        let tight = LayoutConfig { lane_spacing: 150.0, family_spacing: 90.0 };
        // min(24, 80) = 24
        assert!((tight.hook_amplitude() - 24.0).abs() < 1e-9);
    }
}
