//! Aggregate statistics documents.

use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::record::Status;

/// Ordered `(key, count)` pairs, serialized as a JSON object in that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankedCounts(pub Vec<(String, usize)>);

impl RankedCounts {
    pub fn get(&self, key: &str) -> Option<usize> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, c)| *c)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for RankedCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, count) in &self.0 {
            map.serialize_entry(key, count)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for RankedCounts {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = serde_json::Map::<String, serde_json::Value>::deserialize(deserializer)?;
        let pairs = map
            .into_iter()
            .map(|(k, v)| (k, v.as_u64().unwrap_or(0) as usize))
            .collect();
        Ok(Self(pairs))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleCount {
    pub funcao: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreCount {
    pub genero: String,
    pub count: usize,
}

/// Shape of an entry in the most-recent listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentRecord {
    pub id: String,
    pub titulo: String,
    pub funcoes: Vec<String>,
    pub cadastro_em: Option<String>,
    pub status: Status,
}

/// Document written to `estatisticas.json` and served by the read server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_classificados: usize,
    pub classificados_ativos: usize,
    pub classificados_pausados: usize,
    pub classificados_finalizados: usize,
    /// Still `ativo` although `expiracaoEm` has passed
    pub classificados_expirados: usize,
    pub funcoes_mais_procuradas: Vec<RoleCount>,
    pub generos_mais_populares: Vec<GenreCount>,
    pub distribuicao_por_estado: RankedCounts,
    pub distribuicao_por_status: RankedCounts,
    pub media_classificados_por_mes: f64,
    pub ultimos_classificados: Vec<RecentRecord>,
    /// Registered in the last 30 days
    pub classificados_recentes: usize,
    /// Mean days between registration and last update of finished ads
    pub tempo_medio_ativo: f64,
    pub ultima_atualizacao: String,
}

/// Short dataset overview reported after a successful validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total: usize,
    pub active: usize,
    pub paused: usize,
    pub finished: usize,
    pub roles: Vec<String>,
    pub genres: Vec<String>,
    pub states: Vec<String>,
    pub cities: Vec<String>,
}
