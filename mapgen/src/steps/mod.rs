//! The bundled generation step library.

mod cave;
pub use cave::{CellularAutomataSmoothing, RandomViewFill};

mod connect;
pub use connect::{
    CenterPointSelector, ClosestMapAreaConnection, ClosestPointSelector,
    ConnectionPointSelector, OrderedMapAreaConnection, RandomPointSelector,
};

mod doors;
pub use doors::{DoorFinder, RoomDoorConnection};

mod maze;
pub use maze::MazeGeneration;

mod rect_fill;
pub use rect_fill::RectangleGenerator;

mod rooms;
pub use rooms::RoomsGeneration;

mod translate;
pub use translate::{
    AppendItemLists, AreaFinder, RectanglesToAreas, RemoveDuplicatePoints,
};

mod trim;
pub use trim::TunnelDeadEndTrimming;

mod tunnel;
pub use tunnel::{
    DirectLineTunnel, HorizontalVerticalTunnel, TunnelCreator,
};
