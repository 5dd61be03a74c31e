use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting IFC generation");
        self.monitor.log_stats("start");

        // Extract
        tracing::info!("Extracting templates and product data...");
        let source = self.pipeline.extract().await?;
        tracing::info!(
            "Extracted {} property set templates{}",
            source.catalog.property_sets.len(),
            if source.product.is_some() {
                " and product data"
            } else {
                ""
            }
        );
        self.monitor.log_stats("extract");

        // Transform
        tracing::info!("Building IFC model...");
        let generated = self.pipeline.transform(source).await?;
        tracing::info!(
            "Built {} entities ({} property sets, {} tables)",
            generated.model.len(),
            generated.report.property_sets,
            generated.report.tables
        );
        self.monitor.log_stats("transform");

        // Load
        tracing::info!("Writing IFC file...");
        let output_path = self.pipeline.load(generated).await?;
        tracing::info!("Output saved to: {}", output_path);
        self.monitor.log_stats("load");
        self.monitor.log_final_stats();

        Ok(output_path)
    }
}
