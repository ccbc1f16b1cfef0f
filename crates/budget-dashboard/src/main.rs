mod bootstrap;

use anyhow::Result;
use dashboard_core::settings::Settings;
use dashboard_runtime::loader::DashboardLoader;
use dashboard_runtime::store::FilePayloadStore;

fn main() -> Result<()> {
    let settings = Settings::load();

    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("Budget dashboard v{} starting", env!("CARGO_PKG_VERSION"));

    let data_file = bootstrap::resolve_data_file(settings.data_file.clone());
    tracing::info!(
        "Payload: {}, view: {}, expiry window: {} days",
        data_file.display(),
        settings.view,
        settings.expiry_window_days
    );

    let mut loader = DashboardLoader::new(FilePayloadStore::new(&data_file))
        .with_expiry_window(settings.expiry_window_days);

    match settings.view.as_str() {
        "kpis" => print_kpis(&mut loader),
        "ugr" => print_ugr_table(&mut loader),
        "rows" => print_rows(&mut loader)?,
        unknown => eprintln!("Unknown view: {}", unknown),
    }

    if let Some(error) = loader.last_error() {
        tracing::warn!("dataset served from fallback: {}", error);
    }

    Ok(())
}

/// Print the global KPI summary.
fn print_kpis(loader: &mut DashboardLoader<FilePayloadStore>) {
    let kpis = loader.kpis();

    println!("Resumo orçamentário");
    println!("  Total anual estimado:   {:>16.2}", kpis.total_anual_estimado);
    println!("  Total empenhado:        {:>16.2}", kpis.total_empenhado);
    println!("  Total comprometido:     {:>16.2}", kpis.total_comprometido);
    println!("  Saldo a empenhar:       {:>16.2}", kpis.saldo_a_empenhar);
    println!("  Execução:               {:>15.1}%", kpis.percentual_execucao);
    println!("  Contratos vencendo:     {:>16}", kpis.count_expiring_contracts);
    println!("  Contratos vencidos:     {:>16}", kpis.count_expired_contracts);
}

/// Print one line per organizational unit.
fn print_ugr_table(loader: &mut DashboardLoader<FilePayloadStore>) {
    let rollups = loader.ugr_analysis();

    println!(
        "{:<24} {:>16} {:>16} {:>8} {:>7} {:>8}",
        "UGR", "Estimado", "Executado", "Exec.%", "Ativos", "Vencidos"
    );
    for rollup in rollups {
        println!(
            "{:<24} {:>16.2} {:>16.2} {:>7.1}% {:>7} {:>8}",
            rollup.ugr,
            rollup.total_anual_estimado,
            rollup.executado_total,
            rollup.percentual_execucao,
            rollup.contratos_ativos,
            rollup.contratos_expirados
        );
    }
}

/// Dump the normalized rows as JSON for downstream tooling.
fn print_rows(loader: &mut DashboardLoader<FilePayloadStore>) -> Result<()> {
    let rows = loader.all_rows();
    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}
