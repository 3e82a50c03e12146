//! Operating areas and the persisted area selection.
//!
//! The platform is partitioned into a closed set of areas. Label, icon and
//! color lookups are exhaustive matches over [`AreaCode`], so adding an
//! area without its presentation data fails to compile instead of falling
//! back to a placeholder string.

use std::io;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::store::KvStore;

pub const CURRENT_AREA_KEY: &str = "admin_current_area";
pub const AREA_SELECTION_KEY: &str = "admin_area_selection";

/// Most-recent-first selection history is capped at this many entries.
pub const HISTORY_LIMIT: usize = 10;

/// The closed set of operating areas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AreaCode {
    /// Policía Nacional
    Pn,
    /// Policía Local / Guardia Civil
    Ps,
}

impl AreaCode {
    pub const ALL: [Self; 2] = [Self::Pn, Self::Ps];

    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            Self::Pn => "1",
            Self::Ps => "2",
        }
    }

    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "1" => Some(Self::Pn),
            "2" => Some(Self::Ps),
            _ => None,
        }
    }

    #[must_use]
    pub fn short_name(self) -> &'static str {
        match self {
            Self::Pn => "PN",
            Self::Ps => "PS",
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Pn => "PN - Policía Nacional",
            Self::Ps => "PS - Policía Local/Guardia Civil",
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Pn => "Área de Policía Nacional - Oposiciones para acceso a la Policía Nacional",
            Self::Ps => {
                "Área de Policía Local y Guardia Civil - Oposiciones para acceso a Policía Local y Guardia Civil"
            }
        }
    }

    #[must_use]
    pub fn icon(self) -> &'static str {
        match self {
            Self::Pn => "security",
            Self::Ps => "local_police",
        }
    }

    #[must_use]
    pub fn color(self) -> &'static str {
        match self {
            Self::Pn => "#2196F3",
            Self::Ps => "#4CAF50",
        }
    }

    #[must_use]
    pub fn order(self) -> u32 {
        match self {
            Self::Pn => 0,
            Self::Ps => 1,
        }
    }

    /// Materialize the full area record for this code.
    #[must_use]
    pub fn area(self) -> Area {
        Area {
            id: self.id().to_string(),
            name: self.name().to_string(),
            description: self.description().to_string(),
            icon: Some(self.icon().to_string()),
            color: Some(self.color().to_string()),
            enabled: true,
            order: self.order(),
            created_at: None,
            updated_at: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Area {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub enabled: bool,
    pub order: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// The predefined areas, in display order.
#[must_use]
pub fn predefined_areas() -> Vec<Area> {
    AreaCode::ALL.iter().map(|code| code.area()).collect()
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaSelection {
    pub area: Area,
    pub selected_at: DateTime<Utc>,
}

/// Currently selected area plus a bounded history of past selections,
/// persisted in the same key-value store as the credentials.
#[derive(Clone)]
pub struct AreaContext {
    kv: Arc<KvStore>,
    tx: Arc<watch::Sender<Option<Area>>>,
}

impl AreaContext {
    /// Restore the persisted selection, or fall back to the first
    /// predefined area and persist that. The fallback is the only place in
    /// the session core that substitutes a default instead of leaving state
    /// empty.
    #[must_use]
    pub fn initialize(kv: Arc<KvStore>) -> Self {
        let current = kv
            .get(CURRENT_AREA_KEY)
            .and_then(|raw| match serde_json::from_str(&raw) {
                Ok(area) => Some(area),
                Err(err) => {
                    warn!("stored area is corrupt, ignoring: {err}");
                    None
                }
            });

        let (tx, _) = watch::channel(current);
        let context = Self {
            kv,
            tx: Arc::new(tx),
        };

        if context.current().is_none() {
            if let Some(default) = predefined_areas().into_iter().next() {
                debug!("no persisted area, selecting default {}", default.name);
                if let Err(err) = context.set_current(default) {
                    warn!("failed to persist default area: {err}");
                }
            }
        }

        context
    }

    /// Subscribe to selection changes; yields the current value immediately.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Area>> {
        self.tx.subscribe()
    }

    #[must_use]
    pub fn current(&self) -> Option<Area> {
        self.tx.borrow().clone()
    }

    #[must_use]
    pub fn current_id(&self) -> Option<String> {
        self.current().map(|area| area.id)
    }

    /// Select `area`: publish it, write it through, and push a history
    /// entry, truncating the history to [`HISTORY_LIMIT`].
    ///
    /// # Errors
    /// Returns an error if the store cannot be written; the in-memory
    /// selection is still updated.
    pub fn set_current(&self, area: Area) -> io::Result<()> {
        self.tx.send_replace(Some(area.clone()));

        let raw = serde_json::to_string(&area)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
        self.kv.set(CURRENT_AREA_KEY, &raw)?;

        let mut history = self.history();
        history.insert(
            0,
            AreaSelection {
                area,
                selected_at: Utc::now(),
            },
        );
        history.truncate(HISTORY_LIMIT);

        let raw = serde_json::to_string(&history)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
        self.kv.set(AREA_SELECTION_KEY, &raw)
    }

    /// Past selections, most recent first. A corrupt history reads as empty.
    #[must_use]
    pub fn history(&self) -> Vec<AreaSelection> {
        let Some(raw) = self.kv.get(AREA_SELECTION_KEY) else {
            return Vec::new();
        };
        match serde_json::from_str(&raw) {
            Ok(history) => history,
            Err(err) => {
                warn!("stored area history is corrupt, ignoring: {err}");
                Vec::new()
            }
        }
    }

    /// Drop the current selection. The history is kept.
    pub fn clear(&self) {
        self.tx.send_replace(None);
        if let Err(err) = self.kv.remove(CURRENT_AREA_KEY) {
            warn!("failed to clear area selection: {err}");
        }
    }
}
