//! Demonstração local do runner: evento → extração → limpeza → carga
//! particionada em disco.
//!
//! Execute com: `cargo run --example etl_local`

use lakeflow::prelude::*;
use lakeflow::types::DataRow;

fn sample_table() -> Table {
    let mut rows = Vec::new();
    for (dt, valor) in [
        (Some("2024-01-01"), 10),
        (Some("2024-01-01"), 11),
        (None, 12),
        (Some("2024-01-02"), 13),
    ] {
        let mut row = DataRow::new();
        match dt {
            Some(value) => row.insert("dt".to_string(), DataValue::String(value.to_string())),
            None => row.insert("dt".to_string(), DataValue::Null),
        };
        row.insert("valor".to_string(), DataValue::Integer(valor));
        rows.push(row);
    }
    Table::from_rows(rows)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    println!("🚀 Demonstração local do runner ETL com Lakeflow");
    println!("================================================");

    let config = LakeConfig::builder()
        .trusted_bucket("trusted")
        .area("vendas")
        .source("api")
        .table("pedidos")
        .key_column("dt")
        .partition_columns(vec!["dt".to_string()])
        .write_mode(WriteMode::OverwritePartitions)
        .build()?;

    let extractor =
        MemoryExtractor::new().with_object("raw", "pedidos/carga inicial.json", sample_table());

    tokio::fs::create_dir_all("./dados/trusted").await?;
    let loader = PartitionedJsonLoader::new("./dados/trusted");

    let runner = EtlRunner::with_config(config)
        .extract(extractor)
        .load(loader)
        .build();

    // Chave codificada pela notificação: "+" vira espaço
    let event = serde_json::json!({
        "Records": [{ "s3": {
            "bucket": { "name": "raw" },
            "object": { "key": "pedidos/carga+inicial.json" }
        }}]
    });

    let response = runner.handle(&event).await?;
    println!("statusCode: {}", response.status_code);
    println!("body: {}", response.body);

    Ok(())
}
