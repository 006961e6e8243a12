pub mod middleware;
pub mod rest;
pub mod state;

// Re-export the handlers and middleware to make them easily accessible
// to the binary that will build the web server router.
pub use middleware::require_caller;
pub use rest::{
    generate_article_handler, generate_blog_title_handler, generate_image_handler,
    get_published_creations_handler, get_user_creations_handler, remove_image_background_handler,
    remove_object_handler, review_resume_handler, toggle_like_handler,
};
