// Visualizer Module - Timeline Geometry and Interaction
//
// Everything between a filtered record set and paintable geometry, split the
// same way a canvas view is: what is visible, where it goes, how input moves it.

// Marker layout, label rows and axis ticks
pub mod canvas;

// Visible window and its pixel mapping
pub mod timeline;

// Pointer, wheel, button and keyboard input
pub mod interaction;
