use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use zenject::{project, resolve, Injectable, InjectableMember, Injector, PlaceholderFactory, Result};

// 1. Define the abstraction (the trait)
trait Logger: Send + Sync {
  fn log(&self, message: &str);
}

// 2. Define a concrete implementation
struct ConsoleLogger;
impl Logger for ConsoleLogger {
  fn log(&self, message: &str) {
    println!("[CONSOLE LOG]: {}", message);
  }
}

impl Injectable for ConsoleLogger {
  fn construct(_: &mut Injector<'_>) -> Result<Self> {
    Ok(ConsoleLogger)
  }
}

// 3. A product built on demand through a factory
struct Report {
  number: usize,
  logger: Arc<dyn Logger>,
}

static REPORTS: AtomicUsize = AtomicUsize::new(1);

impl Injectable for Report {
  fn dependencies() -> Vec<InjectableMember> {
    vec![InjectableMember::of::<dyn Logger>("logger")]
  }

  fn construct(injector: &mut Injector<'_>) -> Result<Self> {
    Ok(Report {
      number: REPORTS.fetch_add(1, Ordering::SeqCst),
      logger: injector.resolve()?,
    })
  }
}

// 4. A service that depends on the abstraction and the factory
struct ReportService {
  logger: Arc<dyn Logger>,
  reports: Arc<PlaceholderFactory<Report>>,
}

impl Injectable for ReportService {
  fn dependencies() -> Vec<InjectableMember> {
    vec![
      InjectableMember::of::<dyn Logger>("logger"),
      InjectableMember::of::<PlaceholderFactory<Report>>("reports"),
    ]
  }

  fn construct(injector: &mut Injector<'_>) -> Result<Self> {
    Ok(ReportService {
      logger: injector.resolve()?,
      reports: injector.resolve()?,
    })
  }
}

impl ReportService {
  fn generate_report(&self) -> Result<()> {
    self.logger.log("Starting report generation.");
    let report = self.reports.create()?;
    report.logger.log(&format!("Report #{} written.", report.number));
    self.logger.log("Finished report generation.");
    Ok(())
  }
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .init();

  // --- Registration ---

  // The container stores Arc<ConsoleLogger> but serves it as Arc<dyn Logger>.
  project()
    .bind::<dyn Logger>()
    .to::<ConsoleLogger>(|logger| logger)
    .from_new()
    .as_single()
    .finish()?;

  project().bind_factory::<Report>().finish()?;
  project().bind::<ReportService>().from_new().as_cached().finish()?;

  // --- Resolution and Usage ---
  println!("Resolving the high-level service...");
  let report_service = resolve!(ReportService);

  println!("Using the service...");
  report_service.generate_report()?;
  report_service.generate_report()?;

  // The logger is shared: the service and the trait resolve the same instance.
  let logger = resolve!(trait Logger);
  assert!(Arc::ptr_eq(&logger, &report_service.logger));
  Ok(())
}
