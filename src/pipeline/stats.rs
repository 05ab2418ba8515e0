//! Aggregate statistics over the current record set.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Datelike, Duration, Utc};

use crate::models::{
    GenreCount, RankedCounts, RecentRecord, Record, RoleCount, Statistics, Status,
};
use crate::utils::time::format_timestamp;

const TOP_N: usize = 10;
const LATEST_N: usize = 5;
const RECENT_DAYS: i64 = 30;

/// Count lowercased values, keeping first-seen order for equal counts.
fn frequency<'a>(values: impl Iterator<Item = &'a String>) -> Vec<(String, usize)> {
    let mut order: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for value in values {
        let key = value.to_lowercase();
        match index.get(&key) {
            Some(&i) => order[i].1 += 1,
            None => {
                index.insert(key.clone(), order.len());
                order.push((key, 1));
            }
        }
    }

    // sort_by is stable
    order.sort_by(|a, b| b.1.cmp(&a.1));
    order
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Build the statistics document for `records` as of `now`.
pub fn aggregate(records: &[Record], now: DateTime<Utc>) -> Statistics {
    let mut by_status: Vec<(String, usize)> = Vec::new();
    let mut by_state: Vec<(String, usize)> = Vec::new();
    let mut by_month: BTreeMap<(i32, u32), usize> = BTreeMap::new();
    let mut expired = 0;
    let mut recent = 0;
    let recent_cutoff = now - Duration::days(RECENT_DAYS);

    let bump = |table: &mut Vec<(String, usize)>, key: &str| {
        match table.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 += 1,
            None => table.push((key.to_string(), 1)),
        }
    };

    for record in records {
        bump(&mut by_status, record.status.as_str());

        if record.is_active() && record.expires_at().is_some_and(|exp| exp < now) {
            expired += 1;
        }

        if let Some(estado) = record.local.estado.as_deref().filter(|e| !e.is_empty()) {
            bump(&mut by_state, estado);
        }

        if let Some(registered) = record.registered_at() {
            *by_month
                .entry((registered.year(), registered.month()))
                .or_default() += 1;
            if registered >= recent_cutoff {
                recent += 1;
            }
        }
    }

    by_state.sort_by(|a, b| b.1.cmp(&a.1));

    let status_count = |status: Status| {
        by_status
            .iter()
            .find(|(k, _)| k == status.as_str())
            .map_or(0, |(_, c)| *c)
    };

    let monthly_mean = if by_month.is_empty() {
        0.0
    } else {
        let dated: usize = by_month.values().sum();
        round2(dated as f64 / by_month.len() as f64)
    };

    let mut dated: Vec<(DateTime<Utc>, &Record)> = records
        .iter()
        .filter_map(|r| r.registered_at().map(|at| (at, r)))
        .collect();
    dated.sort_by(|a, b| b.0.cmp(&a.0));
    let latest = dated
        .into_iter()
        .take(LATEST_N)
        .map(|(_, r)| RecentRecord {
            id: r.id.clone(),
            titulo: r.titulo.clone(),
            funcoes: r.funcoes.clone(),
            cadastro_em: r.cadastro_em.clone(),
            status: r.status,
        })
        .collect();

    let lifetimes: Vec<f64> = records
        .iter()
        .filter(|r| r.status == Status::Finalizado)
        .filter_map(|r| Some((r.registered_at()?, r.updated_at()?)))
        .map(|(start, end)| (end - start).num_milliseconds() as f64 / 86_400_000.0)
        .collect();
    let mean_lifetime = if lifetimes.is_empty() {
        0.0
    } else {
        round2(lifetimes.iter().sum::<f64>() / lifetimes.len() as f64)
    };

    Statistics {
        total_classificados: records.len(),
        classificados_ativos: status_count(Status::Ativo),
        classificados_pausados: status_count(Status::Pausado),
        classificados_finalizados: status_count(Status::Finalizado),
        classificados_expirados: expired,
        funcoes_mais_procuradas: frequency(records.iter().flat_map(|r| &r.funcoes))
            .into_iter()
            .take(TOP_N)
            .map(|(funcao, count)| RoleCount { funcao, count })
            .collect(),
        generos_mais_populares: frequency(records.iter().flat_map(|r| &r.generos))
            .into_iter()
            .take(TOP_N)
            .map(|(genero, count)| GenreCount { genero, count })
            .collect(),
        distribuicao_por_estado: RankedCounts(by_state),
        distribuicao_por_status: RankedCounts(by_status),
        media_classificados_por_mes: monthly_mean,
        ultimos_classificados: latest,
        classificados_recentes: recent,
        tempo_medio_ativo: mean_lifetime,
        ultima_atualizacao: format_timestamp(now),
    }
}
