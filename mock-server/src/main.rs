use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    let port = std::env::var("PORT").unwrap_or_else(|_| "54321".to_string());
    let api_key = std::env::var("MOCK_API_KEY").unwrap_or_else(|_| "local-dev-key".to_string());
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    println!("mock table API listening on {addr} (apikey: {api_key})");
    mock_server::run(listener, mock_server::MockState::new(&api_key)).await
}
