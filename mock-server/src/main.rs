use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let key_id = std::env::var("RAZORPAY_KEY_ID").unwrap_or_else(|_| mock_server::MOCK_KEY_ID.to_string());
    let key_secret =
        std::env::var("RAZORPAY_KEY_SECRET").unwrap_or_else(|_| mock_server::MOCK_KEY_SECRET.to_string());

    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    println!("listening on {addr} (key id {key_id})");
    mock_server::serve(listener, mock_server::app_with_credentials(&key_id, &key_secret)).await
}
