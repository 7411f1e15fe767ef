#[tokio::main]
async fn main() {
    chewzy_be::start_server().await;
}
