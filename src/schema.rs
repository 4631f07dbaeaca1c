use std::collections::HashSet;

use anyhow::{Result, anyhow};

pub const MATCH_ID_COLUMN: &str = "matchId";

/// Name of the nested participant object. Accepted in attribute lists as a
/// container marker and never emitted as its own column.
pub const CHALLENGES_MARKER: &str = "challenges";

const CHALLENGES_PREFIX: &str = "challenges.";
const INFO_PREFIX: &str = "info.";

/// Attributes that live inside `participant.challenges`.
pub const CHALLENGE_ATTRIBUTES: &[&str] = &["turretTakedowns", "soloKills", "damagePerMinute"];

pub const DEFAULT_ATTRIBUTES: &[&str] = &[
    // identity
    "championName",
    "summonerName",
    "queueId",
    "gameMode",
    "gameType",
    "win",
    "gameEndedInSurrender",
    "gameEndedInEarlySurrender",
    // kda
    "kills",
    "deaths",
    "assists",
    "goldEarned",
    "goldSpent",
    "totalMinionsKilled",
    // objectives
    "baronKills",
    "dragonKills",
    "turretKills",
    "turretTakedowns",
    "turretsLost",
    "inhibitorKills",
    "inhibitorTakedowns",
    "inhibitorsLost",
    "objectivesStolen",
    "objectivesStolenAssists",
    "firstBloodKill",
    "firstBloodAssist",
    "firstTowerKill",
    "firstTowerAssist",
    // damage, healing, cc
    "totalDamageDealtToChampions",
    "damagePerMinute",
    "totalHeal",
    "totalTimeCCDealt",
    "timeCCingOthers",
    "wardsPlaced",
    "wardsKilled",
    "killingSprees",
    "longestTimeSpentLiving",
    "totalTimeSpentDead",
    "bountyLevel",
    "spell1Casts",
    "spell2Casts",
    "spell3Casts",
    "spell4Casts",
    "timePlayed",
    CHALLENGES_MARKER,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeSource {
    /// `participant[name]`
    Participant,
    /// `participant.challenges[name]`
    Challenges,
    /// `info[name]`, only selected with an explicit `info.` prefix
    Match,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub source: AttributeSource,
}

/// Ordered, duplicate-free list of the attributes projected for every
/// participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSchema {
    attributes: Vec<Attribute>,
}

impl AttributeSchema {
    pub fn new(attributes: Vec<Attribute>) -> Self {
        let mut seen = HashSet::new();
        let attributes = attributes
            .into_iter()
            .filter(|attr| attr.name != CHALLENGES_MARKER && attr.name != MATCH_ID_COLUMN)
            .filter(|attr| seen.insert(attr.name.clone()))
            .collect();
        Self { attributes }
    }

    /// Classifies bare names with the known challenge list; everything else
    /// reads from the participant.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Self {
        let attributes = names
            .iter()
            .map(|name| classify(name.as_ref().trim()))
            .filter(|attr| !attr.name.is_empty())
            .collect();
        Self::new(attributes)
    }

    /// Parses a comma separated list; `challenges.` and `info.` prefixes pick
    /// the nested sources explicitly.
    pub fn parse_list(raw: &str) -> Result<Self> {
        let mut attributes = Vec::new();
        for part in raw.split([',', ';']) {
            let name = part.trim();
            if name.is_empty() {
                continue;
            }
            let attr = if let Some(rest) = name.strip_prefix(CHALLENGES_PREFIX) {
                explicit(rest, AttributeSource::Challenges, name)?
            } else if let Some(rest) = name.strip_prefix(INFO_PREFIX) {
                explicit(rest, AttributeSource::Match, name)?
            } else {
                classify(name)
            };
            attributes.push(attr);
        }
        let schema = Self::new(attributes);
        if schema.is_empty() {
            return Err(anyhow!("attribute list `{raw}` names no exportable attributes"));
        }
        Ok(schema)
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Header row: `matchId` followed by every attribute name.
    pub fn columns(&self) -> Vec<String> {
        std::iter::once(MATCH_ID_COLUMN.to_string())
            .chain(self.attributes.iter().map(|attr| attr.name.clone()))
            .collect()
    }
}

impl Default for AttributeSchema {
    fn default() -> Self {
        Self::from_names(DEFAULT_ATTRIBUTES)
    }
}

fn classify(name: &str) -> Attribute {
    let source = if CHALLENGE_ATTRIBUTES.contains(&name) {
        AttributeSource::Challenges
    } else {
        AttributeSource::Participant
    };
    Attribute {
        name: name.to_string(),
        source,
    }
}

fn explicit(name: &str, source: AttributeSource, raw: &str) -> Result<Attribute> {
    let name = name.trim();
    if name.is_empty() || name.contains('.') {
        return Err(anyhow!("invalid attribute `{raw}`"));
    }
    Ok(Attribute {
        name: name.to_string(),
        source,
    })
}
