pub mod play_movies_use_case;
