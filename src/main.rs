//! `bojo-server`: serves the shared order collection from a flat
//! `orders.json` file over the four-route `/api/orders` API.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use structopt::StructOpt;
use tracing::info;

use bojo_ordering::file_store::FileStore;
use bojo_ordering::server;

#[derive(Debug, StructOpt)]
#[structopt(name = "bojo-server", about = "BOJO Restaurant order sync server")]
struct Opt {
    /// Address to bind.
    #[structopt(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on.
    #[structopt(long, default_value = "3000")]
    port: u16,

    /// Directory holding orders.json and the logs/ subdirectory.
    #[structopt(long, parse(from_os_str), default_value = "data")]
    data_dir: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let opt = Opt::from_args();
    bojo_ordering::init_logging(&opt.data_dir.join("logs"));

    let orders_file = opt.data_dir.join("orders.json");
    let store = FileStore::open(&orders_file)
        .with_context(|| format!("opening order file {}", orders_file.display()))?;
    let app = server::router(store);

    let bind = format!("{}:{}", opt.host, opt.port);
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("binding {bind}"))?;
    let addr: SocketAddr = listener.local_addr().context("local addr")?;

    info!("BOJO Restaurant order server listening on http://{addr}");
    info!("Order sync API available at /api/orders");

    axum::serve(listener, app).await.context("serving")?;
    Ok(())
}
