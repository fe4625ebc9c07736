use super::NodeLayout;

/// Stepped path from the bottom of `parent` to the top of `child`, turning halfway
/// between the two ranks.
pub(super) fn route_parent_edge(parent: &NodeLayout, child: &NodeLayout) -> Vec<(f32, f32)> {
    let start = (parent.x + parent.width / 2.0, parent.y + parent.height);
    let end = (child.x + child.width / 2.0, child.y);
    let mid_y = (start.1 + end.1) / 2.0;
    vec![start, (start.0, mid_y), (end.0, mid_y), end]
}

/// Straight segment between the facing sides of two partners.
pub(super) fn route_spouse_edge(a: &NodeLayout, b: &NodeLayout) -> Vec<(f32, f32)> {
    let (a_cx, a_cy) = a.center();
    let (b_cx, b_cy) = b.center();
    if a_cx <= b_cx {
        vec![(a.x + a.width, a_cy), (b.x, b_cy)]
    } else {
        vec![(a.x, a_cy), (b.x + b.width, b_cy)]
    }
}
