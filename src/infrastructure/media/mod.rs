mod imagen_client;
mod unsplash_client;

pub use imagen_client::ImagenClient;
pub use unsplash_client::UnsplashClient;
