// The league root: admin metadata and the ordered set of teams.

use serde::{Deserialize, Serialize};

use crate::team::{normalize_name, Team};

/// League admin metadata. Every field except the name is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeagueAdmin {
    pub name: String,
    pub commissioner: Option<String>,
    pub treasurer: Option<String>,
    pub communications: Option<String>,
    pub historian: Option<String>,
    pub recruitment: Option<String>,
    pub start: Option<String>,
    pub stop: Option<String>,
}

impl LeagueAdmin {
    /// Columns of the `league` table that map onto admin fields.
    pub const FIELDS: [&'static str; 8] = [
        "name",
        "commissioner",
        "treasurer",
        "communications",
        "historian",
        "recruitment",
        "start",
        "stop",
    ];

    /// Assign one admin field by column name. Returns `false` for columns
    /// that are not admin fields.
    pub fn set(&mut self, column: &str, value: String) -> bool {
        let slot = match column {
            "name" => {
                self.name = value;
                return true;
            }
            "commissioner" => &mut self.commissioner,
            "treasurer" => &mut self.treasurer,
            "communications" => &mut self.communications,
            "historian" => &mut self.historian,
            "recruitment" => &mut self.recruitment,
            "start" => &mut self.start,
            "stop" => &mut self.stop,
            _ => return false,
        };
        *slot = Some(value);
        true
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        match column {
            "name" => Some(self.name.as_str()),
            "commissioner" => self.commissioner.as_deref(),
            "treasurer" => self.treasurer.as_deref(),
            "communications" => self.communications.as_deref(),
            "historian" => self.historian.as_deref(),
            "recruitment" => self.recruitment.as_deref(),
            "start" => self.start.as_deref(),
            "stop" => self.stop.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct League {
    pub id: i64,
    pub admin: LeagueAdmin,
    pub teams: Vec<Team>,
}

impl League {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        League {
            id: crate::derive_id(&name),
            admin: LeagueAdmin {
                name,
                ..LeagueAdmin::default()
            },
            teams: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.admin.name
    }

    pub fn team_index_by_id(&self, id: i64) -> Option<usize> {
        self.teams.iter().position(|t| t.id == id)
    }

    /// Case-insensitive, whitespace-trimmed name lookup.
    pub fn team_index_by_name(&self, name: &str) -> Option<usize> {
        let wanted = normalize_name(name);
        if wanted.is_empty() {
            return None;
        }
        self.teams
            .iter()
            .position(|t| normalize_name(&t.name) == wanted)
    }

    pub fn find_team(&self, name: &str) -> Option<&Team> {
        self.team_index_by_name(name).map(|i| &self.teams[i])
    }

    pub fn find_team_by_id(&self, id: i64) -> Option<&Team> {
        self.team_index_by_id(id).map(|i| &self.teams[i])
    }

    /// Append a team, attaching it to this league. Returns its index.
    pub fn add_team(&mut self, mut team: Team) -> usize {
        team.league_id = Some(self.id);
        team.league_name = Some(self.admin.name.clone());
        self.teams.push(team);
        self.teams.len() - 1
    }

    pub fn clear_teams(&mut self) {
        self.teams.clear();
    }

    /// Recompute every player ratio and every team aggregate.
    pub fn recompute_all(&mut self) {
        for team in &mut self.teams {
            team.recompute();
        }
    }

    pub fn player_count(&self) -> usize {
        self.teams.iter().map(|t| t.roster.len()).sum()
    }
}
