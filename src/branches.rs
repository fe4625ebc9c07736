//! Partition a member list into connected family branches.
//!
//! A branch starts at a root (a member with no recorded parents) and collects every
//! descendant and spouse reachable from it that no earlier branch has claimed. Traversal
//! order follows the input order for both roots and children, so attribution of a
//! shared descendant is reproducible: the first branch to reach it keeps it. Members
//! that no root reaches end up in a trailing orphan branch.

use crate::model::{Member, MemberId};
use crate::theme::Theme;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct Branch<'a> {
    pub index: usize,
    pub members: Vec<&'a Member>,
    /// Set on the trailing group of members unreachable from any root.
    pub orphans: bool,
}

impl Branch<'_> {
    pub fn contains(&self, id: MemberId) -> bool {
        self.members.iter().any(|m| m.id == id)
    }
}

pub fn partition_branches(members: &[Member]) -> Vec<Branch<'_>> {
    let index = MemberIndex::new(members);
    let mut visited = vec![false; members.len()];
    let mut branches: Vec<Branch<'_>> = Vec::new();

    for (root_idx, root) in members.iter().enumerate() {
        if !root.is_root() || visited[root_idx] {
            continue;
        }
        let collected = collect_branch(root_idx, members, &index, &mut visited);
        if collected.is_empty() {
            continue;
        }
        branches.push(Branch {
            index: branches.len(),
            members: collected,
            orphans: false,
        });
    }

    let orphans: Vec<&Member> = members
        .iter()
        .zip(&visited)
        .filter(|(_, seen)| !**seen)
        .map(|(member, _)| member)
        .collect();
    if !orphans.is_empty() {
        branches.push(Branch {
            index: branches.len(),
            members: orphans,
            orphans: true,
        });
    }

    branches
}

/// Color per member id, one palette entry per branch.
pub fn branch_colors(branches: &[Branch<'_>], theme: &Theme) -> HashMap<MemberId, String> {
    let mut colors = HashMap::new();
    for branch in branches {
        let color = theme.branch_color(branch.index);
        for member in &branch.members {
            colors.entry(member.id).or_insert_with(|| color.clone());
        }
    }
    colors
}

struct MemberIndex {
    first_position: HashMap<MemberId, usize>,
    children: HashMap<MemberId, Vec<usize>>,
}

impl MemberIndex {
    fn new(members: &[Member]) -> Self {
        let mut first_position = HashMap::new();
        let mut children: HashMap<MemberId, Vec<usize>> = HashMap::new();
        for (idx, member) in members.iter().enumerate() {
            first_position.entry(member.id).or_insert(idx);
            for parent in &member.parent_ids {
                if *parent == member.id {
                    continue;
                }
                let list = children.entry(*parent).or_default();
                if list.last() != Some(&idx) {
                    list.push(idx);
                }
            }
        }
        Self {
            first_position,
            children,
        }
    }
}

// Pre-order depth-first walk: children in input order, then the spouse.
fn collect_branch<'a>(
    start: usize,
    members: &'a [Member],
    index: &MemberIndex,
    visited: &mut [bool],
) -> Vec<&'a Member> {
    let mut collected = Vec::new();
    let mut stack = vec![start];
    while let Some(idx) = stack.pop() {
        if std::mem::replace(&mut visited[idx], true) {
            continue;
        }
        let member = &members[idx];
        collected.push(member);
        if let Some(spouse_idx) = member
            .spouse
            .and_then(|spouse| index.first_position.get(&spouse))
        {
            stack.push(*spouse_idx);
        }
        if let Some(children) = index.children.get(&member.id) {
            stack.extend(children.iter().rev());
        }
    }
    collected
}
