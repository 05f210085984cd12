use clap::Args;
use roomdraw::error::AppError;
use roomdraw::housing::assignments::{
    field_for, AssignmentError, AssignmentOutcome, PreviewResponse, RoomAssignmentService,
};
use roomdraw::housing::seed::{DrawSuite, HousingSeed};
use roomdraw::housing::{
    Draw, DrawId, Group, GroupId, Member, MemberId, Room, RoomId, Suite, SuiteId,
    UndrawnSuitesQuery,
};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

const DEMO_GROUP: GroupId = GroupId(1);

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Seed the demo from a JSON fixture instead of the built-in sample suite.
    #[arg(long)]
    pub(crate) seed_file: Option<PathBuf>,
    /// Group to walk through the workflow (defaults to the sample group).
    #[arg(long)]
    pub(crate) group: Option<u64>,
    /// Print preview payloads as JSON.
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        seed_file,
        group,
        json,
    } = args;

    let seed = match seed_file {
        Some(path) => HousingSeed::from_path(path)?,
        None => sample_seed(),
    };
    let store = Arc::new(seed.into_store()?);
    let service = RoomAssignmentService::new(store.clone());
    let group_id = group.map(GroupId).unwrap_or(DEMO_GROUP);

    println!("Room assignment demo");
    let form = service.form(group_id)?;
    let scope = form.scope();
    println!(
        "Group {} ({} members) in suite {}",
        scope.group.name,
        scope.members.len(),
        scope.group.suite_id
    );
    for room in &scope.rooms {
        println!("- room {} (id {}): {} beds", room.number, room.id, room.beds);
    }

    let undrawn = UndrawnSuitesQuery::new()
        .call(store.as_ref())
        .map_err(AssignmentError::from)?;
    println!("Undrawn suites: {}", undrawn.len());

    let proposals = proposals(&scope.members, &scope.rooms);
    if proposals.is_empty() {
        println!("\nNo members or rooms to assign");
        return Ok(());
    }

    for (label, fields) in &proposals {
        println!("\nPrepare: {label}");
        let response = service.preview(group_id, fields)?;
        render_preview(&response, json);
    }

    let Some((label, fields)) = proposals
        .iter()
        .find(|(_, fields)| matches!(service.prepare(group_id, fields), Ok(p) if p.is_valid()))
    else {
        println!("\nNo proposal passed validation; nothing committed");
        return Ok(());
    };

    println!("\nAssign: {label}");
    render_outcome(&service.assign(group_id, fields)?);

    println!("\nAssign again (expected to fail, rows already exist)");
    render_outcome(&service.assign(group_id, fields)?);

    println!("\nReassign from current rooms");
    let current = service.current(group_id)?;
    render_outcome(&service.reassign(group_id, &current.fields)?);

    Ok(())
}

/// Candidate mappings: everyone in the first room, one member left out, then rooms
/// filled in order.
fn proposals(members: &[Member], rooms: &[Room]) -> Vec<(&'static str, BTreeMap<String, String>)> {
    if members.is_empty() || rooms.is_empty() {
        return Vec::new();
    }

    let mut filled = BTreeMap::new();
    let mut slots = rooms
        .iter()
        .flat_map(|room| std::iter::repeat(room.id).take(room.beds as usize));
    for member in members {
        let room_id = slots.next().unwrap_or(rooms[0].id);
        filled.insert(field_for(member.id), room_id.to_string());
    }

    let crowded: BTreeMap<_, _> = members
        .iter()
        .map(|member| (field_for(member.id), rooms[0].id.to_string()))
        .collect();

    let mut partial = filled.clone();
    if let Some(last) = members.last() {
        partial.insert(field_for(last.id), String::new());
    }

    vec![
        ("everyone in the first room", crowded),
        ("one member left unassigned", partial),
        ("rooms filled in order", filled),
    ]
}

fn render_preview(response: &PreviewResponse, json: bool) {
    if json {
        match serde_json::to_string_pretty(response) {
            Ok(payload) => println!("{payload}"),
            Err(err) => println!("  Preview payload unavailable: {err}"),
        }
        return;
    }

    if !response.valid {
        for error in &response.errors {
            println!("  x {error}");
        }
        return;
    }

    if let Some(preview) = &response.preview {
        for entry in &preview.rooms {
            let names: Vec<&str> = entry.members.iter().map(|m| m.name.as_str()).collect();
            println!(
                "  {} ({}/{} beds): {}",
                entry.room.number,
                entry.members.len(),
                entry.room.beds,
                names.join(", ")
            );
        }
    }
}

fn render_outcome(outcome: &AssignmentOutcome) {
    match outcome {
        AssignmentOutcome::Assigned { redirect, notice } => {
            println!("  {notice} -> {}", redirect.path());
        }
        AssignmentOutcome::Rejected { errors, .. } => {
            for error in errors {
                println!("  rejected: {error}");
            }
        }
        AssignmentOutcome::Failed { error } => println!("  failed: {error}"),
    }
}

fn sample_seed() -> HousingSeed {
    let suite_id = SuiteId(1);
    let draw_id = DrawId(1);
    HousingSeed {
        draws: vec![Draw {
            id: draw_id,
            name: "Spring Draw".to_string(),
        }],
        suites: vec![
            Suite {
                id: suite_id,
                number: "Wing 101".to_string(),
            },
            Suite {
                id: SuiteId(2),
                number: "Wing 102".to_string(),
            },
        ],
        draw_suites: vec![DrawSuite { draw_id, suite_id }],
        rooms: vec![
            Room {
                id: RoomId(11),
                suite_id,
                number: "101A".to_string(),
                beds: 2,
            },
            Room {
                id: RoomId(12),
                suite_id,
                number: "101B".to_string(),
                beds: 1,
            },
        ],
        groups: vec![Group {
            id: DEMO_GROUP,
            name: "Spring Trio".to_string(),
            suite_id,
            draw_id: Some(draw_id),
        }],
        members: ["Alex", "Brook", "Cam"]
            .iter()
            .enumerate()
            .map(|(index, name)| Member {
                id: MemberId(index as u64 + 1),
                group_id: DEMO_GROUP,
                name: name.to_string(),
            })
            .collect(),
        assignments: Vec::new(),
    }
}
