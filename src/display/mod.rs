pub mod canvas;
pub mod graphics;
pub mod renderer;
pub mod surface;
pub mod update_loop;
